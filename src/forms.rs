//! Form input and server-side validation.

use std::collections::BTreeMap;

use axum::extract::Multipart;
use maud::html;
use serde::Deserialize;

use crate::{
    AppResult,
    db::{DataStore, Group},
    media::{self, ImageUpload},
};

pub const REQUIRED: &str = "This field is required.";

/// Field name to error messages. An empty map means the form is valid.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add_error<K: Into<String>, V: Into<String>>(&mut self, key: K, val: V) {
        self.0.entry(key.into()).or_default().push(val.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The inline error list rendered under `field`, empty when it has none.
    pub fn to_html(&self, field: &str) -> String {
        let Some(errors) = self.0.get(field) else {
            return String::new();
        };
        error_list(field, errors)
    }

    /// Logs every field error at debug level.
    pub fn log(&self, form: &str) {
        for (field, errors) in &self.0 {
            tracing::debug!(form, field = %field, errors = ?errors, "form field rejected");
        }
    }
}

/// Raw post form fields as submitted.
/// `<ul class="errorlist">` for one field, `__all__` for form-wide errors.
pub fn error_list(field: &str, errors: &[String]) -> String {
    html! {
        ul class="errorlist" data-field=(field) {
            @for error in errors {
                li { (error) }
            }
        }
    }
    .into_string()
}

#[derive(Debug, Default)]
pub struct PostInput {
    pub text: String,
    pub group: String,
    pub image: Option<Vec<u8>>,
}

impl PostInput {
    /// Reads the `text`, `group` and `image` parts; other parts are ignored.
    /// A file part with no name and no content means no file was chosen.
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut input = PostInput::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("text") => input.text = field.text().await?,
                Some("group") => input.group = field.text().await?,
                Some("image") => {
                    let has_name = field.file_name().is_some_and(|name| !name.is_empty());
                    let bytes = field.bytes().await?;
                    if has_name || !bytes.is_empty() {
                        input.image = Some(bytes.to_vec());
                    }
                }
                _ => {}
            }
        }
        Ok(input)
    }
}

/// A post form that passed validation.
#[derive(Debug)]
pub struct PostForm {
    pub text: String,
    pub group: Option<Group>,
    pub image: Option<ImageUpload>,
}

impl PostForm {
    pub async fn validate(input: PostInput, store: &dyn DataStore) -> AppResult<Result<Self, FormErrors>> {
        let mut errors = FormErrors::default();

        if input.text.trim().is_empty() {
            errors.add_error("text", REQUIRED);
        }

        let group = match input.group.trim() {
            "" => None,
            raw => {
                let found = match raw.parse::<i64>() {
                    Ok(id) => store.group_by_id(id).await?,
                    Err(_) => None,
                };
                if found.is_none() {
                    errors.add_error("group", "Select a valid choice. That choice is not one of the available choices.");
                }
                found
            }
        };

        let image = match input.image {
            None => None,
            Some(bytes) => match media::inspect_upload(bytes).await? {
                Ok(upload) => Some(upload),
                Err(msg) => {
                    errors.add_error("image", msg);
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Ok(Err(errors));
        }

        Ok(Ok(PostForm {
            text: input.text,
            group,
            image,
        }))
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub text: String,
}

impl CommentInput {
    pub fn validate(self) -> Result<String, FormErrors> {
        if self.text.trim().is_empty() {
            let mut errors = FormErrors::default();
            errors.add_error("text", REQUIRED);
            return Err(errors);
        }
        Ok(self.text)
    }
}

/// Usernames that would be shadowed by fixed routes.
const RESERVED_USERNAMES: [&str; 5] = ["auth", "follow", "group", "media", "new"];

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Default, Deserialize)]
pub struct SignupInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl SignupInput {
    /// Checks the fields that don't need the database; username uniqueness is
    /// up to the caller.
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        let username = self.username.trim();

        if username.is_empty() {
            errors.add_error("username", REQUIRED);
        } else if username.chars().count() > 150
            || !username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            errors.add_error(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        } else if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
            errors.add_error("username", "This username is not available.");
        }

        if self.password1.is_empty() {
            errors.add_error("password1", REQUIRED);
        } else if self.password1.chars().count() < MIN_PASSWORD_LEN {
            errors.add_error(
                "password1",
                format!("This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."),
            );
        }

        if self.password2.is_empty() {
            errors.add_error("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add_error("password2", "The two password fields didn't match.");
        }

        errors
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub return_url: Option<String>,
}
