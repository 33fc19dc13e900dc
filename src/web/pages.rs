use std::fmt::Write;

use crate::summary::PodcastDuration;

const PAGE_TITLE: &str = "PDF to Podcast Generator";

/// Result of a finished run as shown on the page
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPodcast {
    /// URL the audio player loads
    pub audio_url: String,
    /// The spoken script
    pub transcript: String,
}

/// Everything the page needs to render
#[derive(Debug, Clone, Default)]
pub struct PageView {
    /// Duration pre-selected in the form
    pub duration: PodcastDuration,
    pub podcast: Option<GeneratedPodcast>,
    pub error: Option<String>,
}

impl PageView {
    pub fn with_duration(duration: PodcastDuration) -> Self {
        Self { duration, ..Self::default() }
    }

    pub fn podcast(mut self, podcast: GeneratedPodcast) -> Self {
        self.podcast = Some(podcast);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_duration_choices(html: &mut String, selected: PodcastDuration) {
    html.push_str("<fieldset><legend>Select podcast duration</legend>\n");
    for duration in PodcastDuration::ALL {
        let value = duration.label().to_lowercase();
        let checked = if duration == selected { " checked" } else { "" };
        let _ = writeln!(
            html,
            "<label><input type=\"radio\" name=\"duration\" value=\"{}\"{}> {}</label>",
            value, checked, duration.label()
        );
    }
    html.push_str("</fieldset>\n");
}

/// Render the full page: upload form, then either the result or an error
pub fn render_page(view: &PageView) -> String {
    let mut html = String::with_capacity(4096);

    let _ = writeln!(html, "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>", PAGE_TITLE);
    html.push_str("<style>body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
        textarea{width:100%;min-height:20rem}.error{color:#b00020;border:1px solid #b00020;padding:.75rem}\
        fieldset{margin:1rem 0}</style>\n</head>\n<body>\n");
    let _ = writeln!(html, "<h1>{}</h1>", PAGE_TITLE);

    html.push_str("<form method=\"post\" action=\"/generate\" enctype=\"multipart/form-data\">\n");
    html.push_str("<label for=\"document\">Upload a PDF file</label>\n");
    html.push_str("<input type=\"file\" id=\"document\" name=\"document\" accept=\".pdf\" required>\n");
    render_duration_choices(&mut html, view.duration);
    html.push_str("<button type=\"submit\">Generate Podcast</button>\n</form>\n");

    if let Some(error) = &view.error {
        let _ = writeln!(html, "<p class=\"error\" role=\"alert\">{}</p>", escape_html(error));
    } else if let Some(podcast) = &view.podcast {
        html.push_str("<h2>Generated podcast</h2>\n");
        let _ = writeln!(
            html,
            "<audio controls preload=\"auto\" src=\"{}\"></audio>",
            escape_html(&podcast.audio_url)
        );
        html.push_str("<h2>Transcript</h2>\n");
        let _ = writeln!(
            html,
            "<textarea id=\"transcript\" readonly>{}</textarea>",
            escape_html(&podcast.transcript)
        );
    }

    html.push_str("</body>\n</html>\n");
    html
}
