use crate::error::{OrderDeskError, OrderDeskResult};
use validator::{Validate, ValidationErrors};

pub fn validate_model<T: Validate>(model: &T) -> OrderDeskResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(OrderDeskError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match (&error.message, &*error.code) {
                (Some(message), _) => format!("{}: {}", field, message),
                (None, "length") => format!("Length validation failed for field '{}'", field),
                (None, "range") => format!("Value out of range for field '{}'", field),
                (None, "required") => format!("Field '{}' is required", field),
                (None, code) => format!("Validation failed for field '{}': {}", field, code),
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

pub fn validate_file_type(file_name: &str, allowed_types: &[String]) -> OrderDeskResult<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !allowed_types.iter().any(|allowed| allowed.eq_ignore_ascii_case(&extension)) {
        return Err(OrderDeskError::validation(
            "file_type",
            format!("File type '{}' not allowed. Allowed types: {}", extension, allowed_types.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> OrderDeskResult<()> {
    if file_size == 0 {
        return Err(OrderDeskError::validation("file_size", "File is empty"));
    }

    if file_size > max_size {
        return Err(OrderDeskError::validation(
            "file_size",
            format!("File size {} bytes exceeds maximum allowed size {} bytes", file_size, max_size),
        ));
    }

    Ok(())
}
