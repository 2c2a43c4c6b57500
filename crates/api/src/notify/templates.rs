//! Fixed welcome templates, one per site
//!
//! Bodies are identical for every subscriber of a site; only the recipient
//! differs.

use sites_shared::Site;

use super::Message;
use crate::routing::TENANT_ROUTES;

/// Guide linked from each site's welcome message, relative to the site's own
/// domain
fn guide_path(site: Site) -> &'static str {
    match site {
        Site::Kaigritun => "/guides/getting-started",
        Site::GetTheJobAi => "/guides/ai-job-search-playbook",
        Site::GigWithAi => "/guides/first-ai-gig",
    }
}

/// Base URL a subscriber of `site` browses. Tenant sites live on their own
/// domain; the primary site uses `public_url`.
fn site_base_url(site: Site, public_url: &str) -> String {
    let prefix = format!("/sites/{}", site.as_str());

    match TENANT_ROUTES.iter().find(|route| route.prefix == prefix) {
        Some(route) => format!("https://{}", route.host),
        None => public_url.trim_end_matches('/').to_string(),
    }
}

fn guide_title(site: Site) -> &'static str {
    match site {
        Site::Kaigritun => "Getting Started with AI Agents",
        Site::GetTheJobAi => "The AI Job Search Playbook",
        Site::GigWithAi => "Landing Your First AI Gig",
    }
}

/// Build the welcome message for `site`. Primary site guides are linked under
/// `public_url`, tenant guides under the tenant's domain.
pub fn welcome_message(site: Site, public_url: &str) -> Message {
    let site_name = site.display_name();
    let guide_title = guide_title(site);
    let guide_link = format!("{}{}", site_base_url(site, public_url), guide_path(site));

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2 style="color: #4f46e5;">Welcome to {site_name}</h2>
    <p>Hi there,</p>
    <p>Thanks for subscribing. As promised, here is your free guide:</p>
    <p>
        <a href="{guide_link}" style="display: inline-block; padding: 12px 24px; background-color: #6366f1; color: white; text-decoration: none; border-radius: 6px; font-weight: bold;">
            {guide_title}
        </a>
    </p>
    <p>We'll only email you when there's something worth reading.</p>
    <hr style="border: none; border-top: 1px solid #eee; margin: 20px 0;">
    <p style="color: #999; font-size: 12px;">{site_name}</p>
</body>
</html>"#,
        site_name = site_name,
        guide_link = guide_link,
        guide_title = guide_title,
    );

    let text = format!(
        "Welcome to {site_name}\n\n\
         Thanks for subscribing. As promised, here is your free guide:\n\n\
         {guide_title}: {guide_link}\n\n\
         We'll only email you when there's something worth reading.\n",
        site_name = site_name,
        guide_title = guide_title,
        guide_link = guide_link,
    );

    Message {
        subject: format!("Your free guide: {}", guide_title),
        html,
        text,
    }
}
