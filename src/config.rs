use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "modarntech.toml";
pub const CONFIG_ENV: &str = "MODARNTECH_CONFIG";

/// Process-wide site configuration. Loaded once at startup and handed to
/// Rocket as managed state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteInfo,
    pub contact: ContactInfo,
    pub social: SocialLinks,
    pub services: Vec<Service>,
    pub technologies: Vec<String>,
    pub nav_links: Vec<NavLink>,
    pub cms_nav_links: Vec<NavLink>,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub operator: OperatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    pub name: String,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub alt_phone: String,
    pub location: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub github: String,
    pub twitter: String,
    pub linkedin: String,
    pub facebook: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub description: String,
    pub features: Vec<String>,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// No `path` means no database: the site runs on the demo dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub expiry_hours: i64,
}

/// Credentials for the first operator, created when the user table is empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub name: Option<String>,
}

/// The part of the configuration safe to hand to visitors.
#[derive(Debug, Serialize)]
pub struct PublicSite<'a> {
    pub site: &'a SiteInfo,
    pub contact: &'a ContactInfo,
    pub social: &'a SocialLinks,
    pub services: &'a [Service],
    pub technologies: &'a [String],
    pub nav_links: &'a [NavLink],
}

impl SiteConfig {
    /// Read the config file named by `MODARNTECH_CONFIG` (or `modarntech.toml`),
    /// falling back to built-in defaults when it does not exist, then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| CONFIG_FILE.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("{} not found, using built-in site defaults", path.display());
            return Ok(SiteConfig::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded site config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Override file values with `SITE_URL`, `DATABASE_PATH`, `OPERATOR_EMAIL`
    /// and `OPERATOR_PASSWORD`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get("SITE_URL") {
            self.site.url = url;
        }
        if let Some(path) = get("DATABASE_PATH") {
            self.database.path = Some(path);
        }
        if let Some(email) = get("OPERATOR_EMAIL") {
            self.operator.email = Some(email);
        }
        if let Some(password) = get("OPERATOR_PASSWORD") {
            self.operator.password = Some(password);
        }
    }

    pub fn database_path(&self) -> Option<&str> {
        self.database.path.as_deref().filter(|p| !p.trim().is_empty())
    }

    pub fn session_hours(&self) -> i64 {
        self.session.expiry_hours.max(1)
    }

    pub fn public(&self) -> PublicSite<'_> {
        PublicSite {
            site: &self.site,
            contact: &self.contact,
            social: &self.social,
            services: &self.services,
            technologies: &self.technologies,
            nav_links: &self.nav_links,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            site: SiteInfo::default(),
            contact: ContactInfo::default(),
            social: SocialLinks::default(),
            services: default_services(),
            technologies: [
                "React", "Next.js", "TypeScript", "Node.js", "Python", "PostgreSQL", "Supabase",
                "Tailwind CSS", "React Native", "Flutter", "Docker", "AWS", "Vercel", "GraphQL",
                "Redis", "MongoDB",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
            nav_links: vec![
                nav("Home", "/", None),
                nav("About", "/about", None),
                nav("Blog", "/blog", None),
                nav("Portfolio", "/portfolio", None),
                nav("Contact", "/contact", None),
            ],
            cms_nav_links: vec![
                nav("Dashboard", "/cms", Some("LayoutDashboard")),
                nav("Posts", "/cms/posts", Some("FileText")),
                nav("Portfolio", "/cms/portfolio", Some("FolderOpen")),
                nav("Newsletter", "/cms/newsletter", Some("Mail")),
                nav("Comments", "/cms/comments", Some("MessageSquare")),
                nav("Analytics", "/cms/analytics", Some("BarChart3")),
            ],
            database: DatabaseConfig::default(),
            session: SessionConfig::default(),
            operator: OperatorConfig::default(),
        }
    }
}

impl Default for SiteInfo {
    fn default() -> Self {
        SiteInfo {
            name: "MODARNTECH".to_string(),
            description: "Building Digital Excellence for Your Business - Web Development, \
                          Mobile Apps, Data Analysis & SEO Solutions"
                .to_string(),
            url: "https://modantech.com".to_string(),
        }
    }
}

impl Default for ContactInfo {
    fn default() -> Self {
        ContactInfo {
            email: "info@modantech.com".to_string(),
            phone: "+256 700 000 000".to_string(),
            alt_phone: "+256 780 000 000".to_string(),
            location: "Jinja, Uganda".to_string(),
            address: "Plot 12, Main Street, Jinja".to_string(),
        }
    }
}

impl Default for SocialLinks {
    fn default() -> Self {
        SocialLinks {
            github: "https://github.com/modantech".to_string(),
            twitter: "https://twitter.com/modantech".to_string(),
            linkedin: "https://linkedin.com/company/modantech".to_string(),
            facebook: "https://facebook.com/modantech".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig { expiry_hours: 24 }
    }
}

fn nav(label: &str, href: &str, icon: Option<&str>) -> NavLink {
    NavLink {
        label: label.to_string(),
        href: href.to_string(),
        icon: icon.map(|i| i.to_string()),
    }
}

fn service(id: &str, title: &str, description: &str, features: &[&str], icon: &str) -> Service {
    Service {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        features: features.iter().map(|f| f.to_string()).collect(),
        icon: icon.to_string(),
    }
}

fn default_services() -> Vec<Service> {
    vec![
        service(
            "web-development",
            "Web Development",
            "Custom web applications built with modern frameworks like React, Next.js, and \
             Node.js. Scalable, performant, and maintainable solutions.",
            &["Custom Web Apps", "E-Commerce", "Progressive Web Apps", "API Development"],
            "Globe",
        ),
        service(
            "web-design",
            "Web Design",
            "Beautiful, responsive designs that convert. From landing pages to full brand \
             experiences with a focus on UX and accessibility.",
            &["UI/UX Design", "Responsive Design", "Brand Identity", "Prototyping"],
            "Palette",
        ),
        service(
            "mobile-development",
            "Mobile Development",
            "Cross-platform mobile applications using React Native and Flutter. Native \
             performance with a single codebase.",
            &["iOS Apps", "Android Apps", "Cross-Platform", "App Store Optimization"],
            "Smartphone",
        ),
        service(
            "data-analysis",
            "Data Analysis",
            "Transform raw data into actionable insights. Dashboards, reports, and data-driven \
             decision making for your business.",
            &["Business Intelligence", "Data Visualization", "Predictive Analytics", "Custom Reports"],
            "BarChart3",
        ),
        service(
            "seo",
            "SEO & Digital Marketing",
            "Boost your online presence with proven SEO strategies and digital marketing \
             campaigns that drive organic growth.",
            &["Technical SEO", "Content Strategy", "Link Building", "Performance Audits"],
            "Search",
        ),
    ]
}
