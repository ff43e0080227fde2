//! Page templates and shared view types.
//!
//! Templates are compiled into the binary and rendered with minijinja; HTML
//! auto-escaping applies to every `.html` template.

use axum::response::Html;
use minijinja::{Environment, Value};
use serde::Serialize;

use crate::DashboardError;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("banner.html", include_str!("../templates/banner.html")),
    ("advisory.html", include_str!("../templates/advisory.html")),
    ("disease.html", include_str!("../templates/disease.html")),
    ("market.html", include_str!("../templates/market.html")),
    ("weather.html", include_str!("../templates/weather.html")),
    ("soil.html", include_str!("../templates/soil.html")),
];

/// One entry in the tab bar; `id` is also the route path.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Tab {
    pub id: &'static str,
    pub title: &'static str,
}

pub const TABS: &[Tab] = &[
    Tab {
        id: "advisory",
        title: "Crop Advisory",
    },
    Tab {
        id: "disease",
        title: "Disease Detection",
    },
    Tab {
        id: "market",
        title: "Market Prices",
    },
    Tab {
        id: "weather",
        title: "Weather",
    },
    Tab {
        id: "soil",
        title: "Soil Health",
    },
];

/// Status message shown above a panel.
#[derive(Debug, Clone, Serialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Info,
    Success,
    Warning,
    Error,
}

impl Banner {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }
}

/// Compiled page templates.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, DashboardError> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        env.add_global("tabs", Value::from_serialize(TABS));
        Ok(Self { env })
    }

    /// Render a page template with `ctx`.
    pub fn render(
        &self,
        name: &str,
        ctx: impl Serialize,
    ) -> Result<Html<String>, DashboardError> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(ctx)?))
    }
}
