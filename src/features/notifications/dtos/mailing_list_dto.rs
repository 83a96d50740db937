use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

fn validate_addresses(emails: &[String]) -> Result<(), ValidationError> {
    match emails.iter().find(|e| !e.trim().validate_email()) {
        Some(bad) => {
            let mut err = ValidationError::new("email");
            err.message = Some(format!("Invalid email address: {}", bad).into());
            Err(err)
        }
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMailingListDto {
    #[validate(
        length(max = 500, message = "A mailing list holds at most 500 addresses"),
        custom(function = "validate_addresses")
    )]
    #[schema(example = json!(["duty.officer@example.org"]))]
    pub emails: Vec<String>,
}
