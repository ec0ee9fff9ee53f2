//! Operator interaction for the manual consent step

use std::io::{self, BufRead, Write};

use credential_core::{CredentialError, Result};

/// Whoever completes consent in the browser and pastes the code back
pub trait Operator {
    /// Show the authorization URL
    fn present_url(&mut self, url: &str) -> Result<()>;

    /// Block until the operator enters the authorization code
    fn read_authorization_code(&mut self) -> Result<String>;
}

/// Operator on the controlling terminal (stdout/stdin)
#[derive(Debug, Default)]
pub struct ConsoleOperator;

impl Operator for ConsoleOperator {
    fn present_url(&mut self, url: &str) -> Result<()> {
        let mut out = io::stdout().lock();
        writeln!(
            out,
            "Open this URL in a browser, sign in and grant every requested permission:\n\n{}\n\n\
             The provider will then show an authorization code.",
            url
        )
        .and_then(|_| out.flush())
        .map_err(|e| CredentialError::UserInputError(format!("cannot write to stdout: {}", e)))
    }

    fn read_authorization_code(&mut self) -> Result<String> {
        print!("Paste the authorization code here: ");
        io::stdout()
            .flush()
            .map_err(|e| CredentialError::UserInputError(format!("cannot write to stdout: {}", e)))?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| CredentialError::UserInputError(format!("cannot read stdin: {}", e)))?;
        Ok(line)
    }
}
