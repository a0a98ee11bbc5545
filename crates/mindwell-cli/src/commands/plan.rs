use clap::Subcommand;
use mindwell_core::SafetyPlan;

use super::{open_app, report};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Print the safety plan
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Replace the safety plan. Omitted sections are saved empty.
    Set {
        /// Personal warning signs
        #[arg(long, default_value = "")]
        warning_signs: String,
        /// Coping strategies that help
        #[arg(long, default_value = "")]
        coping_strategies: String,
        /// People and services to contact
        #[arg(long, default_value = "")]
        support_contacts: String,
    },
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app()?;

    match action {
        PlanAction::Show { json } => {
            let plan = app.safety_plan();
            report(app.drain_events());
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else if plan.is_empty() {
                println!("No safety plan saved yet.");
            } else {
                println!("Warning signs:\n  {}", plan.warning_signs);
                println!("Coping strategies:\n  {}", plan.coping_strategies);
                println!("Support contacts:\n  {}", plan.support_contacts);
                if let Some(at) = plan.last_updated {
                    println!("Last updated: {}", at.format("%Y-%m-%d %H:%M UTC"));
                }
            }
        }
        PlanAction::Set {
            warning_signs,
            coping_strategies,
            support_contacts,
        } => {
            let plan = SafetyPlan::new(warning_signs, coping_strategies, support_contacts);
            let result = app.save_safety_plan(plan);
            report(app.drain_events());
            result?;
        }
    }
    Ok(())
}
