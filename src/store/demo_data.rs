use chrono::{Duration, NaiveDateTime};

use crate::models::analytics::PostView;
use crate::models::comment::Comment;
use crate::models::contact::ContactMessage;
use crate::models::newsletter::Subscriber;
use crate::models::portfolio::Project;
use crate::models::post::{read_time, Post, PostStatus};
use crate::models::user::User;

pub(super) const DEMO_USER_ID: i64 = 1;

/// Days of view history generated for the dashboard charts.
const VIEW_HISTORY_DAYS: i64 = 30;

/// Post ids that receive the generated views, in descending share.
const VIEW_PATTERN: [i64; 15] = [1, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 4, 4, 5];

/// The complete in-memory dataset served in demo mode.
pub(super) struct DemoData {
    pub users: Vec<User>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub subscribers: Vec<Subscriber>,
    pub messages: Vec<ContactMessage>,
    pub projects: Vec<Project>,
    pub views: Vec<PostView>,
}

/// Build the dataset with every timestamp relative to `now`.
pub(super) fn build(now: NaiveDateTime) -> DemoData {
    let posts = posts(now);
    let comments = comments(now, &posts);
    DemoData {
        users: vec![User {
            id: DEMO_USER_ID,
            email: "admin@modantech.com".to_string(),
            password_hash: String::new(),
            full_name: Some("Modantech Team".to_string()),
            avatar_url: None,
            role: "admin".to_string(),
            bio: Some("Engineers and designers building for the web.".to_string()),
            created_at: now - Duration::days(120),
        }],
        views: views(now),
        subscribers: subscribers(now),
        messages: messages(now),
        projects: projects(now),
        posts,
        comments,
    }
}

struct PostSeed {
    title: &'static str,
    slug: &'static str,
    description: &'static str,
    content: &'static str,
    status: PostStatus,
    tags: &'static [&'static str],
    is_premium: bool,
    age_days: i64,
}

const POSTS: &[PostSeed] = &[
    PostSeed {
        title: "Building Scalable Web Apps with Next.js 14",
        slug: "building-scalable-web-apps-with-nextjs-14",
        description: "How we structure large Next.js projects for speed and maintainability.",
        content: "Server components, streaming and the app router change how we think about \
                  rendering. In this post we walk through the folder layout, data fetching \
                  patterns and caching strategy we use on client projects.",
        status: PostStatus::Published,
        tags: &["Next.js", "React", "Web Development"],
        is_premium: false,
        age_days: 2,
    },
    PostSeed {
        title: "React Native vs Flutter: Choosing a Mobile Stack",
        slug: "react-native-vs-flutter",
        description: "A practical comparison from shipping apps with both frameworks.",
        content: "Both frameworks deliver native-feeling apps from a single codebase. We compare \
                  developer experience, performance, ecosystem maturity and hiring.",
        status: PostStatus::Published,
        tags: &["React", "Mobile", "Flutter"],
        is_premium: false,
        age_days: 6,
    },
    PostSeed {
        title: "A Practical Guide to Technical SEO",
        slug: "practical-guide-to-technical-seo",
        description: "Crawlability, structured data and Core Web Vitals explained.",
        content: "Search engines reward fast, well structured pages. This guide covers sitemaps, \
                  canonical URLs, structured data and the metrics that matter.",
        status: PostStatus::Published,
        tags: &["SEO", "Web Development"],
        is_premium: false,
        age_days: 11,
    },
    PostSeed {
        title: "Turning Raw Data into Business Insights",
        slug: "turning-raw-data-into-business-insights",
        description: "Dashboards and pipelines that help small teams decide faster.",
        content: "Collecting data is easy. Making it useful takes clean pipelines, clear metrics \
                  and dashboards people actually open.",
        status: PostStatus::Published,
        tags: &["Data", "Analytics"],
        is_premium: true,
        age_days: 17,
    },
    PostSeed {
        title: "Designing Accessible Interfaces",
        slug: "designing-accessible-interfaces",
        description: "Accessibility habits we apply on every project.",
        content: "Colour contrast, keyboard navigation and semantic markup help every visitor. \
                  We share the checklist our designers and developers follow.",
        status: PostStatus::Published,
        tags: &["Design", "Accessibility", "React"],
        is_premium: false,
        age_days: 24,
    },
    PostSeed {
        title: "Why We Moved Our Stack to PostgreSQL",
        slug: "why-we-moved-to-postgresql",
        description: "Lessons from migrating three production databases.",
        content: "Draft notes on the migration, the tooling we used and what we would do \
                  differently next time.",
        status: PostStatus::Draft,
        tags: &["Databases", "PostgreSQL"],
        is_premium: false,
        age_days: 1,
    },
    PostSeed {
        title: "Launching Our Client Portal",
        slug: "launching-our-client-portal",
        description: "A single place for project updates, invoices and support.",
        content: "Our new client portal brings project timelines, files and support tickets \
                  together.",
        status: PostStatus::Scheduled,
        tags: &["Announcements"],
        is_premium: false,
        age_days: 0,
    },
];

fn posts(now: NaiveDateTime) -> Vec<Post> {
    POSTS
        .iter()
        .enumerate()
        .map(|(i, seed)| {
            let created_at = now - Duration::days(seed.age_days);
            Post {
                id: i as i64 + 1,
                title: seed.title.to_string(),
                slug: seed.slug.to_string(),
                description: Some(seed.description.to_string()),
                content: seed.content.to_string(),
                feature_image: Some(format!("/images/blog/{}.jpg", seed.slug)),
                author_id: Some(DEMO_USER_ID),
                author_name: Some("Modantech Team".to_string()),
                status: seed.status,
                tags: seed.tags.iter().map(|t| t.to_string()).collect(),
                is_premium: seed.is_premium,
                read_time: read_time(seed.content),
                scheduled_at: match seed.status {
                    PostStatus::Scheduled => Some(now + Duration::days(7)),
                    _ => None,
                },
                seo_title: None,
                seo_description: None,
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

fn comments(now: NaiveDateTime, posts: &[Post]) -> Vec<Comment> {
    let seeds: [(i64, &str, &str, bool, i64); 5] = [
        (1, "Sarah Namutebi", "Really clear breakdown of the app router, thanks!", true, 1),
        (1, "David Okello", "Do you have an example repo for the caching setup?", false, 0),
        (2, "Grace Achieng", "We went with Flutter after reading this. Great comparison.", true, 4),
        (3, "Peter Mugisha", "The structured data section saved me hours.", true, 9),
        (4, "Win free prizes", "Click here for amazing offers", false, 2),
    ];
    seeds
        .iter()
        .enumerate()
        .map(|(i, (post_id, name, content, approved, age_days))| {
            let post = posts.iter().find(|p| p.id == *post_id);
            let handle = name.split(' ').next().unwrap_or("guest").to_lowercase();
            Comment {
                id: i as i64 + 1,
                post_id: *post_id,
                author_name: name.to_string(),
                author_email: format!("{}@example.com", handle),
                content: content.to_string(),
                approved: *approved,
                created_at: now - Duration::days(*age_days) - Duration::hours(i as i64),
                post_title: post.map(|p| p.title.clone()),
                post_slug: post.map(|p| p.slug.clone()),
            }
        })
        .collect()
}

fn subscribers(now: NaiveDateTime) -> Vec<Subscriber> {
    let seeds: [(&str, bool, i64); 6] = [
        ("amina@example.com", true, 1),
        ("brian@example.com", true, 3),
        ("carol@example.com", false, 6),
        ("daniel@example.com", true, 12),
        ("esther@example.com", true, 19),
        ("frank@example.com", false, 27),
    ];
    seeds
        .iter()
        .enumerate()
        .map(|(i, (email, confirmed, age_days))| Subscriber {
            id: i as i64 + 1,
            email: email.to_string(),
            confirmed: *confirmed,
            created_at: now - Duration::days(*age_days),
        })
        .collect()
}

fn messages(now: NaiveDateTime) -> Vec<ContactMessage> {
    vec![
        ContactMessage {
            id: 1,
            name: "Joseph Kato".to_string(),
            email: "joseph@example.com".to_string(),
            subject: "New website for our school".to_string(),
            message: "We need a modern website with an events calendar. Can we talk?".to_string(),
            read: false,
            created_at: now - Duration::hours(5),
        },
        ContactMessage {
            id: 2,
            name: "Linda Nakato".to_string(),
            email: "linda@example.com".to_string(),
            subject: "Mobile app quote".to_string(),
            message: "Looking for a delivery app for our shop in Jinja.".to_string(),
            read: false,
            created_at: now - Duration::days(2),
        },
        ContactMessage {
            id: 3,
            name: "Michael Ssali".to_string(),
            email: "michael@example.com".to_string(),
            subject: "SEO audit".to_string(),
            message: "Our traffic dropped last month. Do you offer audits?".to_string(),
            read: true,
            created_at: now - Duration::days(8),
        },
    ]
}

struct ProjectSeed {
    title: &'static str,
    description: &'static str,
    tech_stack: &'static [&'static str],
    category: &'static str,
    featured: bool,
}

const PROJECTS: &[ProjectSeed] = &[
    ProjectSeed {
        title: "Nile Commerce",
        description: "Online store with mobile money checkout for a regional retailer.",
        tech_stack: &["Next.js", "PostgreSQL", "Stripe"],
        category: "Web Development",
        featured: true,
    },
    ProjectSeed {
        title: "FarmLink",
        description: "Mobile marketplace connecting farmers with buyers.",
        tech_stack: &["React Native", "Node.js"],
        category: "Mobile Apps",
        featured: true,
    },
    ProjectSeed {
        title: "ClinicFlow Dashboard",
        description: "Patient flow analytics for a network of clinics.",
        tech_stack: &["Python", "React", "PostgreSQL"],
        category: "Data Analytics",
        featured: true,
    },
    ProjectSeed {
        title: "Safari Lodge Brand",
        description: "Identity and booking site for a boutique lodge.",
        tech_stack: &["Figma", "Next.js"],
        category: "UI/UX Design",
        featured: false,
    },
    ProjectSeed {
        title: "Jinja Tours",
        description: "Search visibility overhaul for a tour operator.",
        tech_stack: &["SEO", "Google Analytics"],
        category: "SEO",
        featured: false,
    },
    ProjectSeed {
        title: "SchoolPay",
        description: "Fee payment app for parents and school bursars.",
        tech_stack: &["Flutter", "Firebase"],
        category: "Mobile Apps",
        featured: false,
    },
];

fn projects(now: NaiveDateTime) -> Vec<Project> {
    PROJECTS
        .iter()
        .enumerate()
        .map(|(i, seed)| {
            let id = i as i64 + 1;
            let slug = crate::models::post::slugify(seed.title);
            Project {
                id,
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                image_url: Some(format!("/images/portfolio/{}.jpg", slug)),
                tech_stack: seed.tech_stack.iter().map(|t| t.to_string()).collect(),
                category: seed.category.to_string(),
                live_url: Some(format!("https://{}.example.com", slug)),
                github_url: None,
                case_study: None,
                featured: seed.featured,
                sort_order: id,
                created_at: now - Duration::days(90 - id * 10),
            }
        })
        .collect()
}

/// A steady, deterministic trickle of views spread over the last month.
fn views(now: NaiveDateTime) -> Vec<PostView> {
    let mut views = Vec::new();
    let mut id = 1;
    for day in 0..VIEW_HISTORY_DAYS {
        let per_day = 12 + (day * 7) % 11;
        let base = now - Duration::days(day);
        for n in 0..per_day {
            let post_id = VIEW_PATTERN[((n + day) as usize) % VIEW_PATTERN.len()];
            views.push(PostView {
                id,
                post_id,
                viewed_at: base - Duration::minutes(n * 3),
                referrer: if n % 3 == 0 { Some("google.com".to_string()) } else { None },
            });
            id += 1;
        }
    }
    views
}
