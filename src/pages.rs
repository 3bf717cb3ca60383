//! Server-rendered pages.
//!
//! Every page puts the time-of-day label on `<body>` as its single class
//! attribute. The label overwrites whatever was there before; nothing else
//! is expected to put classes on that element.

use crate::board::Song;
use crate::scheme::TimeLabel;
use std::collections::HashSet;

pub const STYLE_CSS: &str = include_str!("../assets/style.css");
pub const FAVICON_SVG: &str = include_str!("../assets/favicon.svg");

/// Escape text interpolated into HTML
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page_shell(label: TimeLabel, title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="icon" href="/favicon.ico" type="image/svg+xml">
<link rel="stylesheet" href="/assets/style.css">
</head>
<body class="{class}">
<main>
{body}
</main>
</body>
</html>"#,
        title = escape_html(title),
        class = label.css_class(),
        body = body,
    )
}

/// Login page, with an optional one-shot message ("Bad email.")
pub fn login_page(label: TimeLabel, message: &str) -> String {
    let flash = if message.is_empty() {
        String::new()
    } else {
        format!("<div class=\"flash\">{}</div>\n", escape_html(message))
    };
    let body = format!(
        r#"{flash}<h1>Campus Jukebox</h1>
<p>Sign in with your school account to see the board and vote.</p>
<p><a href="/login"><button>Sign in with Google</button></a></p>"#,
        flash = flash,
    );
    page_shell(label, "Campus Jukebox - Sign in", &body)
}

fn render_song(song: &Song, voted: &HashSet<String>) -> String {
    let title = if song.title.is_empty() {
        song.song_id.clone()
    } else {
        song.title.clone()
    };
    let explicit = if song.is_explicit {
        " <small>[explicit]</small>"
    } else {
        ""
    };
    let button = if voted.contains(&song.song_id) {
        "<button disabled>Voted</button>".to_string()
    } else {
        format!(
            r#"<form method="post" action="/api/v1/vote"><input type="hidden" name="song_id" value="{id}"><button>Vote</button></form>"#,
            id = escape_html(&song.song_id),
        )
    };
    format!(
        r#"<div class="song">
<div class="votes">{votes}</div>
<div class="meta"><a href="https://open.spotify.com/track/{id}">{title}</a>{explicit}<div class="uploader">submitted by {uploader}</div></div>
{button}
</div>"#,
        votes = song.vote_count,
        id = escape_html(&song.song_id),
        title = escape_html(&title),
        explicit = explicit,
        uploader = escape_html(&song.submitted_by),
        button = button,
    )
}

/// The song board for a signed-in user
pub fn board_page(label: TimeLabel, user_name: &str, songs: &[Song], voted: &HashSet<String>) -> String {
    let mut rows = String::new();
    for song in songs {
        rows.push_str(&render_song(song, voted));
        rows.push('\n');
    }

    let body = format!(
        r#"<h1>Campus Jukebox</h1>
<p>Signed in as {user} &middot; <a href="/api/v1/logout">log out</a></p>
{rows}<div class="submit-box">
<h2>Submit a song</h2>
<form method="post" action="/api/v1/submit_song">
<input type="text" name="song_id" placeholder="Spotify track id" required>
<input type="text" name="title" placeholder="Title">
<label><input type="checkbox" name="is_explicit" value="true"> Explicit</label>
<button>Submit</button>
</form>
</div>"#,
        user = escape_html(user_name),
        rows = rows,
    );
    page_shell(label, "Campus Jukebox", &body)
}
