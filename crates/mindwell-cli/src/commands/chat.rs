use std::io::{BufRead, Write};

use clap::Args;

use super::{open_app, report};

#[derive(Args)]
pub struct ChatArgs {
    /// Message to send. Without one, reads messages from stdin until EOF.
    message: Option<String>,
}

pub async fn run(args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app()?;

    if let Some(message) = args.message {
        let reply = app.send_chat(&message).await?;
        report(app.drain_events());
        println!("{}", reply.text);
        return Ok(());
    }

    if let Some(welcome) = app.conversation().turns().first() {
        println!("{}", welcome.text);
    }
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let reply = app.send_chat(&line).await?;
        report(app.drain_events());
        println!("{}", reply.text);
    }
    Ok(())
}
