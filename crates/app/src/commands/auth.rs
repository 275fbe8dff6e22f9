//! Local account commands

use classmatch_core::{Access, ProfileUpdate, SignupRequest, UserProfile};

use super::{argument_error, ProfileArgs, SignupArgs};
use crate::error::Result;
use crate::state::AppState;

pub fn status(state: &AppState) -> String {
    match state.auth.access() {
        Access::Allow(user) => format!("Logged in as {} <{}>", user.name, user.email),
        Access::Deny => "Not logged in".to_string(),
        Access::Pending => "Session not loaded yet".to_string(),
    }
}

pub fn login(state: &AppState, email: &str, password: &str) -> Result<String> {
    let user = state.auth.login(email, password)?;
    Ok(format!("Welcome back, {}!", user.name))
}

pub fn signup(state: &AppState, args: SignupArgs) -> Result<String> {
    let mut request = SignupRequest::new(args.email, args.password, args.name);
    request.major = args.major;
    request.year = args.year;
    request.bio = args.bio;

    let user = state.auth.signup(request)?;
    Ok(format!("Account created for {} ({})", user.name, user.avatar))
}

pub fn logout(state: &AppState) -> Result<String> {
    state.auth.logout()?;
    Ok("Logged out".to_string())
}

pub async fn profile(state: &AppState) -> Result<String> {
    let user = state.auth.require_user().await?;
    Ok(render_profile(&user))
}

pub async fn update_profile(state: &AppState, args: ProfileArgs) -> Result<String> {
    let current = state.auth.require_user().await?;

    let touches_prefs = args.times.is_some() || args.locations.is_some() || args.style.is_some();
    let study_preferences = touches_prefs.then(|| {
        let mut prefs = current.study_preferences.clone();
        if let Some(times) = args.times {
            prefs.times = times;
        }
        if let Some(locations) = args.locations {
            prefs.location = locations;
        }
        if let Some(style) = args.style {
            prefs.style = style;
        }
        prefs
    });

    let updates = ProfileUpdate {
        name: args.name,
        avatar: args.avatar,
        major: args.major,
        year: args.year,
        bio: args.bio,
        enrolled_courses: args.courses,
        study_preferences,
    };
    if is_empty(&updates) {
        return Err(argument_error("Nothing to update"));
    }

    let user = state.auth.update_profile(updates)?;
    Ok(render_profile(&user))
}

fn is_empty(updates: &ProfileUpdate) -> bool {
    updates.name.is_none()
        && updates.avatar.is_none()
        && updates.major.is_none()
        && updates.year.is_none()
        && updates.bio.is_none()
        && updates.enrolled_courses.is_none()
        && updates.study_preferences.is_none()
}

fn render_profile(user: &UserProfile) -> String {
    let mut lines = vec![
        format!("[{}] {} <{}>", user.avatar, user.name, user.email),
    ];
    if let Some(major) = &user.major {
        lines.push(format!("Major:     {}", major));
    }
    if let Some(year) = &user.year {
        lines.push(format!("Year:      {}", year));
    }
    if let Some(bio) = &user.bio {
        lines.push(format!("Bio:       {}", bio));
    }
    lines.push(format!("Courses:   {}", user.enrolled_courses.join(", ")));

    let prefs = &user.study_preferences;
    lines.push(format!("Times:     {}", prefs.times.join(", ")));
    lines.push(format!("Locations: {}", prefs.location.join(", ")));
    lines.push(format!("Style:     {}", prefs.style));
    lines.join("\n")
}
