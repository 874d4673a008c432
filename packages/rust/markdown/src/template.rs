//! Fixed presentation template wrapped around every rendered section.

use docsplit_shared::RenderConfig;

/// Styling applied uniformly to every section document.
#[derive(Debug, Clone)]
pub struct Template {
    /// CSS font stack for body text.
    pub font_family: String,
    /// Body font size in points.
    pub font_size_pt: u32,
    /// Color shared by all heading levels.
    pub heading_color: String,
    /// Border color for table cells.
    pub table_border_color: String,
}

impl Default for Template {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for Template {
    fn from(config: &RenderConfig) -> Self {
        Self {
            font_family: config.font_family.clone(),
            font_size_pt: config.font_size_pt,
            heading_color: config.heading_color.clone(),
            table_border_color: config.table_border_color.clone(),
        }
    }
}

impl Template {
    /// Build the stylesheet for this template.
    pub fn stylesheet(&self) -> String {
        let font = css_value(&self.font_family);
        let heading = css_value(&self.heading_color);
        let border = css_value(&self.table_border_color);
        let size = self.font_size_pt;

        format!(
            "body {{ font-family: {font}; font-size: {size}pt; line-height: 1.4; color: #222222; }}\n\
             h1, h2, h3, h4, h5, h6 {{ font-family: {font}; color: {heading}; margin: 12pt 0 6pt 0; }}\n\
             h1 {{ font-size: 20pt; }}\n\
             h2 {{ font-size: 16pt; }}\n\
             h3 {{ font-size: 13pt; }}\n\
             p {{ margin: 0 0 8pt 0; }}\n\
             table {{ border-collapse: collapse; width: 100%; margin: 6pt 0 10pt 0; }}\n\
             th, td {{ border: 1px solid {border}; padding: 4pt 6pt; vertical-align: top; }}\n\
             th {{ background-color: #F2F2F2; font-weight: bold; }}\n\
             ul, ol {{ margin: 0 0 8pt 0; padding-left: 24pt; }}\n\
             li {{ margin-bottom: 2pt; }}\n\
             code, pre {{ font-family: Consolas, 'Courier New', monospace; font-size: 10pt; }}\n\
             pre {{ background-color: #F6F8FA; padding: 6pt; }}\n\
             blockquote {{ border-left: 3pt solid {border}; margin-left: 0; padding-left: 10pt; color: #555555; }}\n"
        )
    }

    /// Wrap an HTML body fragment in a complete, styled HTML document.
    pub fn wrap(&self, body_html: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            self.stylesheet(),
            body_html
        )
    }
}

/// Keep a config-supplied value from escaping its CSS declaration.
fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';'))
        .collect()
}
