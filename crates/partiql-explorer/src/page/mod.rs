//! The explorer page: query form, result pane, environment form.

pub mod tutorial;

pub use tutorial::{TUTORIAL_ENVIRONMENT, TUTORIAL_QUERY};

/// Form target for query execution.
pub const EXECUTE_PATH: &str = "/execute";

/// Form field carrying the query text.
pub const QUERY_FIELD: &str = "query";

/// Form field carrying the environment text.
pub const ENV_FIELD: &str = "env";

/// Render the page with `query` and `environment` in their text areas and
/// `result` in the result pane. All three are HTML-escaped.
pub fn render(query: &str, environment: &str, result: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head><title>PartiQL Explorer</title>
<style>
textarea {{
	white-space: pre;
}}
</style>
</head>
<body>
<h1>PartiQL Explorer</h1>
<p>Execute <a href="https://partiql.org/">PartiQL</a> queries. See the <a href="https://partiql.org/tutorial.html">tutorial</a> for example queries.</p>

<form method="post" action="{EXECUTE_PATH}">
<h2>Query</h2>
<textarea name="{QUERY_FIELD}" rows="10" cols="120" autofocus>{query}</textarea>
<p><input type="submit" value="Execute"></p>

<h2>Results</h2>
<pre>{result}</pre>

<h2>Data</h2>
<textarea name="{ENV_FIELD}" rows="10" cols="120">{environment}</textarea>
</form>
</body>
</html>
"#,
        query = escape_html(query),
        result = escape_html(result),
        environment = escape_html(environment),
    )
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&#34;")
        .replace('\'', "&#39;")
}
