use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

fn default_port() -> u16 {
    8787
}

#[derive(Deserialize)]
pub struct Env {
    #[serde(default = "default_port")]
    pub port: u16,

    pub asr_vendor_a_token: String,
    pub asr_vendor_b_auth_header: String,

    pub translator_quality_api_key: String,
    pub translator_speed_auth_header: String,

    #[serde(default)]
    pub debug: bool,
}

static ENV: OnceLock<Env> = OnceLock::new();

pub fn env() -> &'static Env {
    ENV.get_or_init(|| {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let _ = dotenvy::from_path(manifest_dir.join(".env"));
        envy::from_env().expect("failed to load environment")
    })
}
