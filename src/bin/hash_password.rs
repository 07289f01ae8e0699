use std::io::{self, Write};

// prints an argon2 hash for the password_hash field of the users file
fn main() -> anyhow::Result<()> {
    eprint!("Enter password: ");
    io::stderr().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim();

    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    println!("{}", site_api::auth::password::hash_password(password)?);
    Ok(())
}
