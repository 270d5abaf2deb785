//! Bundled posts served when the CMS yields nothing.
//!
//! Shipped with the binary and edited alongside the code. Entries use the same
//! `BlogPost` / `BlogCategory` shape as CMS content.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

use crate::blog::models::{BlogCategory, BlogPost};
use crate::blog::normalize::reading_time;

struct StaticPost {
    id: u64,
    slug: &'static str,
    title: &'static str,
    excerpt: &'static str,
    content: &'static str,
    author: &'static str,
    published_at: &'static str,
    category: &'static str,
    tags: &'static [&'static str],
    featured: bool,
    featured_image: Option<&'static str>,
}

struct StaticCategory {
    id: u64,
    name: &'static str,
    slug: &'static str,
    description: &'static str,
}

const POSTS: &[StaticPost] = &[
    StaticPost {
        id: 1,
        slug: "build-professional-cv-gets-noticed",
        title: "How to Build a Professional CV That Gets Noticed",
        excerpt: "Recruiters skim a CV in seconds. Structure, clarity and measurable results decide whether yours makes the shortlist.",
        content: "<h2>Start with a clear headline</h2>\
<p>Your headline is the first thing a recruiter reads. Make it specific: the role you do, the domain you know and the level you work at. \
\"Senior Backend Engineer, payments and fintech\" says far more than \"Hard-working professional\".</p>\
<h2>Lead with results, not duties</h2>\
<p>Every bullet under a role should answer one question: what changed because you were there? Numbers help. \
Cut release time from two weeks to two days. Grew the newsletter from 3,000 to 18,000 subscribers. Reduced support tickets by a third.</p>\
<h2>Keep it scannable</h2>\
<p>Use consistent dates, short bullets and plenty of white space. One or two pages is enough for most careers. \
Put the most relevant experience first and trim anything older than fifteen years unless it is directly relevant.</p>\
<h2>Tailor it for every application</h2>\
<p>Mirror the language of the job description where it honestly describes your experience. \
Applicant tracking systems match keywords, and so do tired recruiters.</p>\
<h2>Publish it</h2>\
<p>A public profile page gives hiring managers a link they can share with the rest of the team. \
Keep it in sync with your CV and add projects, writing and links that do not fit on paper.</p>",
        author: "Folio Team",
        published_at: "2024-01-15T09:00:00Z",
        category: "CV Writing",
        tags: &["cv", "resume", "job search"],
        featured: true,
        featured_image: Some("/assets/blog/professional-cv.jpg"),
    },
    StaticPost {
        id: 2,
        slug: "link-in-bio-for-professionals",
        title: "Why Every Professional Needs a Link-in-Bio Page",
        excerpt: "One link that carries your story, your work and your contact details everywhere you show up online.",
        content: "<p>Social profiles give you a single link. Use it well. A professional link-in-bio page collects your CV, portfolio, \
writing and contact details in one place, so people who find you on one platform can see the whole picture.</p>\
<h2>What to include</h2>\
<p>A short bio in your own voice, your current role, two or three highlighted projects and the links people actually need: \
email, LinkedIn, GitHub or Dribbble, and a downloadable CV.</p>\
<h2>Track what works</h2>\
<p>View counts and link clicks tell you which channels send interested people your way. \
Double down on those and stop spending time on the ones that do not.</p>",
        author: "Folio Team",
        published_at: "2024-02-02T09:00:00Z",
        category: "Personal Branding",
        tags: &["personal brand", "portfolio", "networking"],
        featured: true,
        featured_image: Some("/assets/blog/link-in-bio.jpg"),
    },
    StaticPost {
        id: 3,
        slug: "ats-friendly-resume-tips",
        title: "10 Tips for an ATS-Friendly Resume",
        excerpt: "Applicant tracking systems filter out most resumes before a human sees them. Here is how to get through.",
        content: "<ol>\
<li><p>Use standard section headings such as Experience, Education and Skills.</p></li>\
<li><p>Avoid tables, text boxes and columns that parsers read out of order.</p></li>\
<li><p>Save as PDF unless the posting asks for another format.</p></li>\
<li><p>Include the exact job title you are applying for.</p></li>\
<li><p>Spell out acronyms once: Search Engine Optimization (SEO).</p></li>\
<li><p>List skills the posting names, if you have them.</p></li>\
<li><p>Put dates on the right of the same line as the role.</p></li>\
<li><p>Do not hide keywords in white text. Parsers and people both notice.</p></li>\
<li><p>Keep fonts simple and sizes readable.</p></li>\
<li><p>Test your file by pasting it into a plain text editor.</p></li>\
</ol>",
        author: "Folio Team",
        published_at: "2024-02-20T09:00:00Z",
        category: "CV Writing",
        tags: &["ats", "resume", "job search"],
        featured: true,
        featured_image: Some("/assets/blog/ats-resume.jpg"),
    },
    StaticPost {
        id: 4,
        slug: "showcase-projects-portfolio",
        title: "Showcasing Projects in Your Online Portfolio",
        excerpt: "Projects prove what a job title only claims. Pick the right ones and tell their story well.",
        content: "<p>Choose three to five projects that match the work you want next, not everything you have ever built.</p>\
<h2>Tell the story</h2>\
<p>For each project describe the problem, your role, the decisions you made and the outcome. \
Screenshots and short demos beat long descriptions.</p>\
<h2>Link to evidence</h2>\
<p>Repositories, live sites, case studies and talks all make a project concrete. Broken links do the opposite, so check them regularly.</p>",
        author: "Folio Team",
        published_at: "2024-03-08T09:00:00Z",
        category: "Personal Branding",
        tags: &["portfolio", "projects"],
        featured: false,
        featured_image: None,
    },
    StaticPost {
        id: 5,
        slug: "prepare-for-behavioral-interviews",
        title: "Preparing for Behavioral Interviews",
        excerpt: "Structured stories about real situations are the backbone of a strong interview.",
        content: "<p>Behavioral questions ask about what you did, not what you would do. Prepare six to eight stories that cover conflict, \
failure, leadership, ambiguity and delivery under pressure.</p>\
<h2>Use a structure</h2>\
<p>Situation, task, action, result. Spend most of the time on the action and be specific about your own part in it.</p>\
<h2>Practice out loud</h2>\
<p>Stories that read well on paper often run long when spoken. Aim for two minutes each.</p>",
        author: "Folio Team",
        published_at: "2024-03-25T09:00:00Z",
        category: "Interviews",
        tags: &["interviews", "job search"],
        featured: false,
        featured_image: None,
    },
    StaticPost {
        id: 6,
        slug: "custom-domain-professional-profile",
        title: "Using a Custom Domain for Your Professional Profile",
        excerpt: "Your name as a web address is memorable, portable and looks great on a business card.",
        content: "<p>A custom domain makes your profile yours. If you change platforms the address stays the same, \
and every link you have ever shared keeps working.</p>\
<h2>Pick a name</h2>\
<p>Your full name is best. If it is taken, add a middle initial or your profession. Avoid numbers and hyphens where you can.</p>\
<h2>Point it at your profile</h2>\
<p>Add the DNS record your profile host gives you, wait for it to propagate and check that the secure certificate has been issued.</p>",
        author: "Folio Team",
        published_at: "2024-04-10T09:00:00Z",
        category: "Personal Branding",
        tags: &["personal brand", "domains"],
        featured: false,
        featured_image: None,
    },
];

const CATEGORIES: &[StaticCategory] = &[
    StaticCategory {
        id: 1,
        name: "CV Writing",
        slug: "cv-writing",
        description: "Write a CV that gets past the filters and in front of people.",
    },
    StaticCategory {
        id: 2,
        name: "Personal Branding",
        slug: "personal-branding",
        description: "Present your work and your story online.",
    },
    StaticCategory {
        id: 3,
        name: "Interviews",
        slug: "interviews",
        description: "Prepare for every stage of the interview process.",
    },
];

static FALLBACK_POSTS: Lazy<Vec<BlogPost>> = Lazy::new(|| {
    let mut posts: Vec<BlogPost> = POSTS.iter().map(to_post).collect();
    posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    posts
});

static FALLBACK_CATEGORIES: Lazy<Vec<BlogCategory>> = Lazy::new(|| {
    CATEGORIES
        .iter()
        .map(|c| BlogCategory {
            id: c.id,
            name: c.name.to_string(),
            slug: c.slug.to_string(),
            description: c.description.to_string(),
            post_count: POSTS.iter().filter(|p| p.category == c.name).count() as u32,
        })
        .collect()
});

fn to_post(p: &StaticPost) -> BlogPost {
    let published_at = p.published_at.parse::<DateTime<Utc>>().unwrap_or_default();
    BlogPost {
        id: p.id,
        title: p.title.to_string(),
        slug: p.slug.to_string(),
        excerpt: p.excerpt.to_string(),
        content: p.content.to_string(),
        author: p.author.to_string(),
        published_at,
        updated_at: published_at,
        tags: p.tags.iter().map(|t| t.to_string()).collect(),
        category: p.category.to_string(),
        featured: p.featured,
        reading_time: reading_time(p.content),
        featured_image: p.featured_image.map(str::to_string),
        seo_title: None,
        seo_description: None,
    }
}

/// Matches a category query against a post's category name, by slug or name.
pub fn category_matches(category_name: &str, query: &str) -> bool {
    category_name.eq_ignore_ascii_case(query) || slug::slugify(category_name) == query
}

/// All bundled posts, newest first.
pub fn fallback_posts() -> &'static [BlogPost] {
    &FALLBACK_POSTS
}

pub fn fallback_categories() -> Vec<BlogCategory> {
    FALLBACK_CATEGORIES.clone()
}

pub fn fallback_post_by_slug(slug: &str) -> Option<BlogPost> {
    FALLBACK_POSTS.iter().find(|p| p.slug == slug).cloned()
}

pub fn fallback_featured(limit: usize) -> Vec<BlogPost> {
    FALLBACK_POSTS
        .iter()
        .filter(|p| p.featured)
        .take(limit)
        .cloned()
        .collect()
}

pub fn fallback_recent(limit: usize, category: Option<&str>) -> Vec<BlogPost> {
    fallback_posts()
        .iter()
        .filter(|p| category.map_or(true, |c| category_matches(&p.category, c)))
        .take(limit)
        .cloned()
        .collect()
}

/// Case-insensitive substring match over title, excerpt and tags.
pub fn fallback_search(query: &str, limit: usize) -> Vec<BlogPost> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    FALLBACK_POSTS
        .iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&needle)
                || p.excerpt.to_lowercase().contains(&needle)
                || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .take(limit)
        .cloned()
        .collect()
}
