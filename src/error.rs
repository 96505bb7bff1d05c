//! Application error type.
//!
//! Every fallible operation in the crate returns `Result<_, AppError>`. The
//! error carries the process exit code the binary should terminate with:
//!
//! | code | meaning                                   |
//! |------|-------------------------------------------|
//! | 2    | invalid input file or configuration       |
//! | 3    | not enough usable observations            |
//! | 4    | the optimizer could not produce a fit     |
//! | 5    | writing results, plots or logs failed     |

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub const INPUT: u8 = 2;
    pub const DATA: u8 = 3;
    pub const FIT: u8 = 4;
    pub const OUTPUT: u8 = 5;

    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(Self::INPUT, message)
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(Self::DATA, message)
    }

    pub fn fit(message: impl Into<String>) -> Self {
        Self::new(Self::FIT, message)
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::new(Self::OUTPUT, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_carry_exit_codes() {
        assert_eq!(AppError::input("x").exit_code(), 2);
        assert_eq!(AppError::data("x").exit_code(), 3);
        assert_eq!(AppError::fit("x").exit_code(), 4);
        assert_eq!(AppError::output("x").exit_code(), 5);
    }

    #[test]
    fn display_is_the_message() {
        let err = AppError::input("bad column");
        assert_eq!(err.to_string(), "bad column");
        assert_eq!(err.message(), "bad column");
    }
}
