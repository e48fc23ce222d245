//! Form bodies. Field names accept the legacy Spanish names as aliases.

use serde::Deserialize;

use crate::accounts::NewAccount;
use crate::catalogue::EntryFields;

#[derive(Debug, Deserialize)]
pub struct NewEntryForm {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "imagen", alias = "img")]
    pub image: String,
    #[serde(alias = "descripcion")]
    pub description: String,
    #[serde(default, alias = "aclamada", alias = "aclamado")]
    pub acclaimed: Option<String>,
}

impl From<NewEntryForm> for EntryFields {
    fn from(form: NewEntryForm) -> Self {
        Self {
            acclaimed: checkbox(form.acclaimed.as_deref()),
            name: form.name,
            image: form.image,
            description: form.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryForm {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "image", alias = "imagen")]
    pub img: String,
    #[serde(alias = "descripcion")]
    pub description: String,
    #[serde(default, alias = "aclamado", alias = "aclamada")]
    pub acclaimed: Option<String>,
}

impl From<UpdateEntryForm> for EntryFields {
    fn from(form: UpdateEntryForm) -> Self {
        Self {
            acclaimed: checkbox(form.acclaimed.as_deref()),
            name: form.name,
            image: form.img,
            description: form.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "apellido")]
    pub surname: String,
    pub email: String,
    pub password: String,
    #[serde(alias = "fechaNacimiento")]
    pub dob: String,
    #[serde(alias = "pais")]
    pub country: String,
    #[serde(default, alias = "terminos")]
    pub terms: Option<String>,
}

impl From<RegisterForm> for NewAccount {
    fn from(form: RegisterForm) -> Self {
        Self {
            terms_accepted: checkbox(form.terms.as_deref()),
            name: form.name,
            surname: form.surname,
            email: form.email,
            password: form.password,
            date_of_birth: form.dob,
            country: form.country,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// HTML checkboxes are only submitted when ticked; explicit falsy values are
/// accepted too.
fn checkbox(value: Option<&str>) -> bool {
    let Some(raw) = value else {
        return false;
    };
    let normalized = raw.trim().to_ascii_lowercase();
    !matches!(normalized.as_str(), "" | "0" | "false" | "off" | "no")
}

#[cfg(test)]
mod tests {
    use super::{checkbox, NewEntryForm, RegisterForm};
    use crate::accounts::NewAccount;
    use crate::catalogue::EntryFields;

    #[test]
    fn checkbox_is_true_when_ticked() {
        assert!(checkbox(Some("on")));
        assert!(checkbox(Some("true")));
        assert!(checkbox(Some("1")));
    }

    #[test]
    fn checkbox_is_false_when_absent_or_falsy() {
        assert!(!checkbox(None));
        assert!(!checkbox(Some("")));
        assert!(!checkbox(Some("OFF")));
        assert!(!checkbox(Some("0")));
    }

    #[test]
    fn legacy_field_names_are_accepted() -> Result<(), serde_urlencoded::de::Error> {
        let form: NewEntryForm = serde_urlencoded::from_str(
            "nombre=Alien&imagen=alien.jpg&descripcion=Space&aclamada=on",
        )?;
        let fields = EntryFields::from(form);
        assert_eq!(fields.name, "Alien");
        assert_eq!(fields.image, "alien.jpg");
        assert!(fields.acclaimed);

        let form: RegisterForm = serde_urlencoded::from_str(
            "nombre=Ada&apellido=Lovelace&email=a%40b.c&password=pw&fechaNacimiento=1815-12-10&pais=UK",
        )?;
        let account = NewAccount::from(form);
        assert_eq!(account.surname, "Lovelace");
        assert_eq!(account.email, "a@b.c");
        assert!(!account.terms_accepted);
        Ok(())
    }
}
