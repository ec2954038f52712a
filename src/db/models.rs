use garde::Validate;
use serde::{Deserialize, Serialize};

/// A validated document shape that lives in a named collection.
///
/// Collection names are the lowercased type name (`BlogPost` -> `blogpost`).
pub trait Record: Serialize + Validate<Context = ()> {
    const COLLECTION: &'static str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct User {
    #[garde(skip)]
    pub name: String,
    #[garde(email, custom(deliverable_email))]
    pub email: String,
    #[garde(skip)]
    pub password_hash: String,
    #[serde(default)]
    #[garde(skip)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_true")]
    #[garde(skip)]
    pub is_active: bool,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            name,
            email,
            password_hash,
            avatar_url: None,
            is_active: true,
        }
    }
}

impl Record for User {
    const COLLECTION: &'static str = "user";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BlogPost {
    #[garde(skip)]
    pub title: String,
    #[garde(skip)]
    pub slug: String,
    #[garde(skip)]
    pub excerpt: String,
    /// Markdown body.
    #[garde(skip)]
    pub content: String,
    #[serde(default)]
    #[garde(skip)]
    pub cover_image: Option<String>,
    #[serde(default)]
    #[garde(skip)]
    pub tags: Vec<String>,
    #[serde(default)]
    #[garde(skip)]
    pub author: Option<String>,
}

impl Record for BlogPost {
    const COLLECTION: &'static str = "blogpost";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ContactMessage {
    #[garde(skip)]
    pub name: String,
    #[garde(email, custom(deliverable_email))]
    pub email: String,
    #[garde(skip)]
    pub subject: String,
    #[garde(skip)]
    pub message: String,
}

impl Record for ContactMessage {
    const COLLECTION: &'static str = "contactmessage";
}

/// Catalogue entry. No endpoint stores these yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Product {
    #[garde(skip)]
    pub title: String,
    #[serde(default)]
    #[garde(skip)]
    pub description: Option<String>,
    /// Price in dollars.
    #[garde(range(min = 0.0))]
    pub price: f64,
    #[garde(skip)]
    pub category: String,
    #[serde(default = "default_true")]
    #[garde(skip)]
    pub in_stock: bool,
}

impl Record for Product {
    const COLLECTION: &'static str = "product";
}

fn default_true() -> bool {
    true
}

/// Stricter than the RFC grammar: the domain needs a dot and no label may be empty.
///
/// Addresses without an `@` are left to the `email` rule.
pub fn deliverable_email(value: &str, _ctx: &()) -> garde::Result {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return Ok(());
    };
    if !domain.contains('.') {
        return Err(garde::Error::new("email domain must contain a dot"));
    }
    if local.split('.').chain(domain.split('.')).any(str::is_empty) {
        return Err(garde::Error::new("email has an empty label"));
    }
    Ok(())
}

/// Canonical spelling used for lookups and storage: the domain is lowercased,
/// the local part is kept as typed.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// A single rejected field and the constraint it broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Proof that the wrapped value passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Valid<T>(T);

impl<T> Valid<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Valid<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// Validate a value, collecting every failing field.
pub fn validate<T: Validate<Context = ()>>(value: T) -> Result<Valid<T>, Vec<FieldError>> {
    match value.validate() {
        Ok(()) => Ok(Valid(value)),
        Err(report) => Err(report
            .iter()
            .map(|(path, error)| FieldError::new(path.to_string(), error.message()))
            .collect()),
    }
}
