use crate::error::ValidationError;

pub const MAX_TITLE_CHARS: usize = 200;

/// Trimmed, checked fields of a resource or forum post submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    pub title: String,
    pub body: String,
}

pub fn resource_fields(title: &str, description: &str) -> Result<PostFields, ValidationError> {
    Ok(PostFields {
        title: title_field(title)?,
        body: required("description", description)?,
    })
}

pub fn forum_post_fields(title: &str, content: &str) -> Result<PostFields, ValidationError> {
    Ok(PostFields {
        title: title_field(title)?,
        body: required("content", content)?,
    })
}

pub fn comment_content(content: &str) -> Result<String, ValidationError> {
    required("content", content)
}

fn title_field(title: &str) -> Result<String, ValidationError> {
    let title = required("title", title)?;
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::TooLong {
            field: "title",
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(title)
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(value.to_string())
}
