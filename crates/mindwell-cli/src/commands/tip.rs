use mindwell_core::storage::Database;
use mindwell_core::tips;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    println!("{}", tips::daily_tip(&db)?);
    Ok(())
}
