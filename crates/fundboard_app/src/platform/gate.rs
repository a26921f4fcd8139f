//! Optional shared-secret access gate. No configured code means no gate.

use std::io::{self, BufRead, Write};

use anyhow::bail;
use board_logging::board_info;
use fundboard_engine::{keys, CacheStore};
use serde_json::Value;

/// Block until the user supplies the configured access code, remembering a
/// successful unlock in the cache. Changing the code invalidates old tokens.
pub(crate) fn ensure_unlocked(cache: &CacheStore, access_code: Option<&str>) -> anyhow::Result<()> {
    let Some(code) = access_code else {
        return Ok(());
    };
    if let Some(entry) = cache.read(keys::UNLOCK) {
        if entry.value.as_str() == Some(code) {
            return Ok(());
        }
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Access code: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            bail!("access gate: input closed before unlock");
        };
        if line?.trim() == code {
            cache.write(keys::UNLOCK, &Value::String(code.to_string()));
            board_info!("access gate unlocked");
            return Ok(());
        }
        println!("Incorrect access code.");
    }
}
