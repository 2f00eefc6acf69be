use std::thread;
use std::time::Duration;

use crate::ipc::types::Collections;
use crate::model::User;
use crate::seed;

pub enum LoginFailure {
    MissingFields,
    InvalidCredentials,
}

impl LoginFailure {
    pub fn code(&self) -> &'static str {
        match self {
            LoginFailure::MissingFields => "validation_failed",
            LoginFailure::InvalidCredentials => "invalid_credentials",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LoginFailure::MissingFields => "Please fill in all fields.",
            // One message for unknown user and wrong password alike.
            LoginFailure::InvalidCredentials => {
                "Invalid credentials. Default: admin/adminpassword or staff/staffpassword"
            }
        }
    }
}

/// Simulated authentication round-trip: a fixed blocking delay with no
/// cancellation path, then a plain equality check against the built-in test
/// credentials and the stored staff/student users. Users created through the
/// UI default their password to their username.
pub fn login(
    data: &Collections,
    username: &str,
    password: &str,
    school_id: &str,
    delay: Duration,
) -> Result<User, LoginFailure> {
    thread::sleep(delay);

    if username.is_empty() || password.is_empty() || school_id.is_empty() {
        return Err(LoginFailure::MissingFields);
    }

    if username == seed::ADMIN_USERNAME && password == seed::ADMIN_PASSWORD {
        return Ok(with_school(seed::admin_user(), school_id));
    }
    if username == seed::STAFF_USERNAME && password == seed::STAFF_PASSWORD {
        return Ok(with_school(seed::staff_login_user(), school_id));
    }

    let found = data
        .staff
        .iter()
        .chain(data.students.iter())
        .find(|u| u.username == username);
    if let Some(user) = found {
        let stored = user.password.as_deref().unwrap_or(&user.username);
        if password == stored {
            return Ok(with_school(user.clone(), school_id));
        }
    }

    Err(LoginFailure::InvalidCredentials)
}

fn with_school(mut user: User, school_id: &str) -> User {
    user.school_id = school_id.to_string();
    user
}
