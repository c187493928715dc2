use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use ntex::web;
use ntex::web::{HttpRequest, Responder};
use ntex_files::NamedFile;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use spdlog::{debug, info, warn};

use crate::config::Config;
use crate::watcher::{rebuild, spawn_watcher, DevState, SharedState};

pub const RELOAD_PATH: &str = "/__quire/reload";

const RELOAD_SCRIPT: &str = r#"<script>
(function () {
  var generation = null;
  setInterval(function () {
    fetch("/__quire/reload").then(function (r) { return r.json(); }).then(function (s) {
      if (generation !== null && s.generation !== generation) { location.reload(); }
      generation = s.generation;
      if (s.error) { console.error("quire: " + s.error); }
    }).catch(function () {});
  }, 1000);
})();
</script>
"#;

struct AppState {
    output_dir: PathBuf,
    path_prefix: String,
    dev: SharedState,
}

#[derive(Serialize, Debug, PartialEq)]
struct ReloadStatus {
    generation: u64,
    error: Option<String>,
}

/// Where a request path lands in the output directory
#[derive(Debug, PartialEq)]
enum Resolved {
    File(PathBuf),
    Forbidden,
    NotFound,
}

/// Maps an url path into the output directory. Segments are percent-decoded, then `..` is refused.
fn resolve_path(output_dir: &Path, path_prefix: &str, url_path: &str) -> Resolved {
    let rel = if url_path == path_prefix.trim_end_matches('/') {
        ""
    } else {
        match url_path.strip_prefix(path_prefix) {
            Some(rel) => rel,
            None => return Resolved::NotFound,
        }
    };

    let mut file_path = output_dir.to_path_buf();
    for segment in rel.split('/') {
        let Ok(part) = percent_decode_str(segment).decode_utf8() else {
            return Resolved::NotFound;
        };
        // Encoded separators are refused
        if part.contains(|c: char| c == '/' || c == '\\') {
            return Resolved::Forbidden;
        }
        for component in Path::new(&*part).components() {
            match component {
                Component::Normal(name) => file_path.push(name),
                Component::CurDir => {}
                _ => return Resolved::Forbidden,
            }
        }
    }

    if file_path.is_dir() {
        file_path.push("index.html");
    }
    if file_path.is_file() {
        Resolved::File(file_path)
    } else {
        Resolved::NotFound
    }
}

fn inject_reload_script(html: &str) -> String {
    match html.rfind("</body>") {
        Some(pos) => format!("{}{}{}", &html[..pos], RELOAD_SCRIPT, &html[pos..]),
        None => format!("{}{}", html, RELOAD_SCRIPT),
    }
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
}

#[web::get("/__quire/reload")]
async fn reload_status(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let status = match state.dev.lock() {
        Ok(dev) => ReloadStatus { generation: dev.generation, error: dev.last_error.clone() },
        Err(_) => return web::HttpResponse::InternalServerError().body("Dev server state is poisoned"),
    };

    match serde_json::to_string(&status) {
        Ok(body) => web::HttpResponse::Ok()
            .content_type("application/json")
            .header("Cache-Control", "no-store")
            .body(body),
        Err(e) => web::HttpResponse::InternalServerError().body(format!("Error serializing status: {}", e)),
    }
}

async fn serve_output(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let url_path = req.path();
    if url_path == "/" && state.path_prefix != "/" {
        return web::HttpResponse::TemporaryRedirect()
            .header("Location", state.path_prefix.as_str())
            .finish();
    }

    let file_path = match resolve_path(&state.output_dir, &state.path_prefix, url_path) {
        Resolved::File(path) => path,
        Resolved::Forbidden => {
            warn!("Refusing path {}", url_path);
            return web::HttpResponse::Forbidden().body("Access forbidden");
        }
        Resolved::NotFound => {
            debug!("Not found: {}", url_path);
            return web::HttpResponse::NotFound().body(format!("Not found: {}", url_path));
        }
    };

    if is_html(&file_path) {
        return match std::fs::read_to_string(&file_path) {
            Ok(html) => web::HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(inject_reload_script(&html)),
            Err(e) => web::HttpResponse::InternalServerError()
                .body(format!("Error reading {}: {}", file_path.display(), e)),
        };
    }

    match NamedFile::open(&file_path) {
        Ok(file) => <NamedFile as Responder>::respond_to(file, &req).await,
        Err(e) => web::HttpResponse::InternalServerError()
            .body(format!("Error opening {}: {}", file_path.display(), e)),
    }
}

/// Builds the site with drafts, then serves the output directory and rebuilds it on source changes
pub async fn server_run(config: Config) -> io::Result<()> {
    let dev: SharedState = Arc::new(Mutex::new(DevState::default()));
    rebuild(&config, &dev);
    spawn_watcher(config.clone(), dev.clone());

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    info!("Serving {} on http://{}:{}{}", config.paths.output_dir.display(),
        bind_addr, bind_port, config.build.path_prefix);

    let app_state = Arc::new(AppState {
        output_dir: config.paths.output_dir.clone(),
        path_prefix: config.build.path_prefix.clone(),
        dev,
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(reload_status)
            .default_service(web::route().to(serve_output))
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_resolve_path() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path();
        fs::create_dir_all(out.join("posts/hello")).unwrap();
        fs::write(out.join("index.html"), "home").unwrap();
        fs::write(out.join("posts/hello/index.html"), "hello").unwrap();
        fs::write(out.join("feed.xml"), "feed").unwrap();

        assert_eq!(resolve_path(out, "/", "/"), Resolved::File(out.join("index.html")));
        assert_eq!(resolve_path(out, "/", "/posts/hello/"), Resolved::File(out.join("posts/hello/index.html")));
        assert_eq!(resolve_path(out, "/", "/posts/hello"), Resolved::File(out.join("posts/hello/index.html")));
        assert_eq!(resolve_path(out, "/", "/feed.xml"), Resolved::File(out.join("feed.xml")));
        assert_eq!(resolve_path(out, "/", "/posts/missing/"), Resolved::NotFound);
        assert_eq!(resolve_path(out, "/", "/posts/../../etc/passwd"), Resolved::Forbidden);
    }

    #[test]
    fn test_resolve_path_with_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path();
        fs::write(out.join("index.html"), "home").unwrap();

        assert_eq!(resolve_path(out, "/blog/", "/blog/"), Resolved::File(out.join("index.html")));
        assert_eq!(resolve_path(out, "/blog/", "/blog"), Resolved::File(out.join("index.html")));
        assert_eq!(resolve_path(out, "/blog/", "/other/"), Resolved::NotFound);
        assert_eq!(resolve_path(out, "/blog/", "/blogx/"), Resolved::NotFound);
    }

    #[test]
    fn test_resolve_encoded_path() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path();
        fs::create_dir_all(out.join("posts/trip")).unwrap();
        fs::write(out.join("posts/trip/my photo.jpg"), "jpg").unwrap();
        fs::write(out.join("posts/trip/ñandú.png"), "png").unwrap();

        assert_eq!(resolve_path(out, "/", "/posts/trip/my%20photo.jpg"), Resolved::File(out.join("posts/trip/my photo.jpg")));
        assert_eq!(resolve_path(out, "/", "/posts/trip/%C3%B1and%C3%BA.png"), Resolved::File(out.join("posts/trip/ñandú.png")));
        assert_eq!(resolve_path(out, "/", "/posts/%2e%2e/%2E%2E/etc/passwd"), Resolved::Forbidden);
        assert_eq!(resolve_path(out, "/", "/posts/..%2F..%2Fetc/passwd"), Resolved::Forbidden);
        assert_eq!(resolve_path(out, "/", "/posts/trip%5C..%5Csecret"), Resolved::Forbidden);
        assert_eq!(resolve_path(out, "/", "/posts/%FF.jpg"), Resolved::NotFound);
    }

    #[test]
    fn test_inject_reload_script() {
        let html = inject_reload_script("<html><body><p>hi</p></body></html>");
        assert!(html.starts_with("<html><body><p>hi</p><script>"));
        assert!(html.ends_with("</script>\n</body></html>"));
        assert!(html.contains(RELOAD_PATH));

        let fragment = inject_reload_script("<p>no body</p>");
        assert!(fragment.starts_with("<p>no body</p><script>"));
    }

    #[test]
    fn test_reload_status_json() {
        let status = ReloadStatus { generation: 3, error: None };
        assert_eq!(serde_json::to_string(&status).unwrap(), r#"{"generation":3,"error":null}"#);
    }
}
