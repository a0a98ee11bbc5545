use clap::Subcommand;
use mindwell_core::{AccountService, Config, Database, FirebaseAuth};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Sign in and remember the session
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the remembered session
    Signout,
    /// Show who is signed in
    Status,
    /// Send a password reset email
    ResetPassword {
        #[arg(long)]
        email: String,
    },
}

pub async fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    if let AuthAction::Status = action {
        match AccountService::<FirebaseAuth>::stored_session(&db)? {
            Some(session) => println!("Signed in as {} ({})", session.email, session.user_id),
            None => println!("Not signed in."),
        }
        return Ok(());
    }

    let config = Config::load()?;
    let provider = FirebaseAuth::from_config(&config.auth, config.auth_api_key())?;
    let mut accounts = AccountService::new(provider);
    accounts.restore(&db)?;

    match action {
        AuthAction::Signup {
            email,
            password,
            name,
        } => {
            let session = accounts.create_account(&db, &email, &password, &name).await?;
            println!("Account created for {}. Sign in to continue.", session.email);
        }
        AuthAction::Signin { email, password } => {
            let session = accounts.sign_in(&db, &email, &password).await?;
            println!("Signed in as {} ({})", session.email, session.user_id);
        }
        AuthAction::Signout => {
            let session = accounts.sign_out(&db).await?;
            println!("Signed out {}.", session.email);
        }
        AuthAction::ResetPassword { email } => {
            accounts.send_password_reset(&email).await?;
            println!("Password reset email sent to {email}.");
        }
        AuthAction::Status => {}
    }
    Ok(())
}
