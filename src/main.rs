//! Host-side helper: `cargo run` builds the WASM package into `static/pkg`
//! and serves `static/` on a local HTTP server.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::process::{Command, Stdio};
    use std::{thread, time::Duration};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("building WASM pkg");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(st) => {
            log::error!("wasm-pack finished with {st}");
            std::process::exit(1);
        }
        Err(_) => {
            log::warn!(
                "wasm-pack not found in PATH; serving whatever is already in static/pkg \
                 (https://rustwasm.github.io/wasm-pack/)"
            );
        }
    }

    log::info!("serving the magma demo at http://127.0.0.1:8000");
    let server = Command::new("python3")
        .args(["-m", "http.server", "8000", "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    let mut server = match server {
        Ok(child) => child,
        Err(err) => {
            log::error!("failed to start http server: {err}");
            std::process::exit(1);
        }
    };

    // Keep process alive while the server runs
    loop {
        match server.try_wait() {
            Ok(Some(status)) => {
                log::error!("http server exited with {status}");
                std::process::exit(1);
            }
            Ok(None) => thread::sleep(Duration::from_secs(5)),
            Err(err) => {
                log::error!("lost track of the http server: {err}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
