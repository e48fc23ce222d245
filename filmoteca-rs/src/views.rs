//! Server-rendered pages. Templates are compiled into the binary.

use minijinja::Environment;
use serde::Serialize;

/// Every page the application can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    AdminCatalogue,
    Modify,
    Register,
    Login,
    UserProfile,
    AdminProfile,
}

impl View {
    #[cfg(test)]
    pub const ALL: [View; 7] = [
        View::Home,
        View::AdminCatalogue,
        View::Modify,
        View::Register,
        View::Login,
        View::UserProfile,
        View::AdminProfile,
    ];

    fn template(self) -> &'static str {
        match self {
            View::Home => "home.html",
            View::AdminCatalogue => "adminMovie.html",
            View::Modify => "modify.html",
            View::Register => "register.html",
            View::Login => "login.html",
            View::UserProfile => "profileUser.html",
            View::AdminProfile => "profileAdmin.html",
        }
    }
}

const TEMPLATES: [(&str, &str); 8] = [
    ("layout.html", include_str!("../templates/layout.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("adminMovie.html", include_str!("../templates/adminMovie.html")),
    ("modify.html", include_str!("../templates/modify.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("profileUser.html", include_str!("../templates/profileUser.html")),
    ("profileAdmin.html", include_str!("../templates/profileAdmin.html")),
];

#[derive(Debug)]
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    /// Parse every template up front so syntax errors fail at startup.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, view: View, context: S) -> Result<String, minijinja::Error> {
        self.env.get_template(view.template())?.render(context)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use anyhow::Result;
    use minijinja::context;

    use super::{View, Views};
    use crate::catalogue::CatalogueEntry;

    fn entry() -> CatalogueEntry {
        CatalogueEntry {
            id: 10_001,
            name: String::from("Alien"),
            image: String::from("alien.jpg"),
            description: String::from("In space <no one> hears"),
            acclaimed: true,
        }
    }

    #[test]
    fn every_view_renders_inside_layout() -> Result<()> {
        let views = Views::new()?;
        for view in View::ALL {
            let html = views.render(view, context! { entry => entry(), entries => vec![entry()] })?;
            assert!(html.contains("<html"), "{view:?} did not render the layout");
        }
        Ok(())
    }

    #[test]
    fn listing_escapes_entry_fields() -> Result<()> {
        let views = Views::new()?;
        let html = views.render(View::Home, context! { entries => vec![entry()] })?;

        assert!(html.contains("Alien"));
        assert!(html.contains("In space &lt;no one&gt; hears"));
        assert!(html.contains("Aclamada"));
        Ok(())
    }

    #[test]
    fn modify_form_is_prefilled() -> Result<()> {
        let views = Views::new()?;
        let html = views.render(View::Modify, context! { entry => entry() })?;

        assert!(html.contains("action=\"/adminMovie/modify/10001\""));
        assert!(html.contains("value=\"alien.jpg\""));
        assert!(html.contains("checked"));
        Ok(())
    }

    #[test]
    fn login_shows_error_message() -> Result<()> {
        let views = Views::new()?;
        let html = views.render(
            View::Login,
            context! { error_message => "incorrect email or password", is_register_page => true },
        )?;
        assert!(html.contains("incorrect email or password"));
        Ok(())
    }
}
