use std::{env, process::ExitCode};

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};

// usage: cargo run --bin hash_once <ADMIN_PASSWORD>
// prints a line ready to paste into .env
fn main() -> ExitCode {
    let Some(password) = env::args().nth(1).filter(|p| !p.is_empty()) else {
        eprintln!("usage: hash_once <ADMIN_PASSWORD>");
        return ExitCode::from(2);
    };

    let salt = SaltString::generate(&mut OsRng);
    match Argon2::default().hash_password(password.as_bytes(), &salt) {
        Ok(hash) => {
            // single quotes keep the `$` separators intact for dotenv and shells
            println!("ADMIN_PASSWORD_HASH='{hash}'");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("hashing failed: {e}");
            ExitCode::FAILURE
        }
    }
}
