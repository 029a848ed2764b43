//! Upload form served at `GET /`.

use crate::layout::FitPolicy;
use crate::pipeline::DeckOptions;

/// Escape HTML special characters to prevent XSS attacks.
fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Human-readable label for a fit policy option.
fn fit_label(policy: FitPolicy) -> &'static str {
    match policy {
        FitPolicy::FitWidth => "Fit width",
        FitPolicy::FitHeight => "Fit height",
        FitPolicy::Fill => "Fill (stretch)",
        FitPolicy::Letterbox => "Letterbox",
    }
}

/// Generate the upload page, pre-filled with `defaults`.
pub fn render_upload_form(defaults: &DeckOptions) -> String {
    let fit_options: String = FitPolicy::ALL
        .iter()
        .map(|policy| {
            let selected = if *policy == defaults.fit_policy {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{value}"{selected}>{label}</option>"#,
                value = html_escape(policy.name()),
                label = fit_label(*policy),
            )
        })
        .collect::<Vec<_>>()
        .join("\n                ");

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Deck Builder</title>
    <style>
        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}
        body {{
            background: #0f0f0f;
            color: #e5e5e5;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
            display: flex;
            justify-content: center;
            padding: 48px 16px;
        }}
        form {{
            width: 100%;
            max-width: 420px;
            background: rgba(0, 0, 0, 0.75);
            border: 1px solid rgba(255, 255, 255, 0.1);
            border-radius: 8px;
            padding: 24px;
        }}
        h1 {{
            font-size: 18px;
            font-weight: 600;
            margin-bottom: 16px;
        }}
        label {{
            display: block;
            font-size: 12px;
            color: #999;
            margin: 12px 0 4px;
        }}
        input, select {{
            width: 100%;
            padding: 8px;
            background: #1a1a1a;
            color: #e5e5e5;
            border: 1px solid #333;
            border-radius: 4px;
        }}
        .size {{
            display: flex;
            gap: 8px;
        }}
        button {{
            margin-top: 20px;
            width: 100%;
            padding: 10px;
            background: #2563eb;
            color: #fff;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }}
    </style>
</head>
<body>
    <form method="post" action="/" enctype="multipart/form-data">
        <h1>Images to slide deck</h1>

        <label for="images_zip">ZIP archive of PNG/JPEG images</label>
        <input type="file" id="images_zip" name="images_zip" accept=".zip" required>

        <div class="size">
            <div>
                <label for="slide_width_px">Slide width (px)</label>
                <input type="number" id="slide_width_px" name="slide_width_px" min="1" value="{width}">
            </div>
            <div>
                <label for="slide_height_px">Slide height (px)</label>
                <input type="number" id="slide_height_px" name="slide_height_px" min="1" value="{height}">
            </div>
        </div>

        <label for="fit_mode">Fit mode</label>
        <select id="fit_mode" name="fit_mode">
                {fit_options}
        </select>

        <button type="submit">Build presentation</button>
    </form>
</body>
</html>"##,
        width = defaults.slide_width_px,
        height = defaults.slide_height_px,
        fit_options = fit_options,
    )
}
