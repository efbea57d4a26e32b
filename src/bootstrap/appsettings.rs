//! Web App setting promotion
//!
//! App Service exposes application settings as `APPSETTING_<NAME>`. Promotion
//! copies each one to `<NAME>` so the rest of the program sees plain names.

use crate::resolve::EnvStore;
use tracing::debug;

/// Copy every `prefix + NAME` variable to `NAME`, overwriting existing values
///
/// Keys equal to the bare prefix are skipped. Returns the promoted names in
/// key order of the store's snapshot.
pub fn promote_app_settings<E>(env: &mut E, prefix: &str) -> Vec<String>
where
    E: EnvStore + ?Sized,
{
    let mut promoted = Vec::new();

    for key in env.keys() {
        let Some(name) = key.strip_prefix(prefix) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let Some(value) = env.get(&key) else {
            continue;
        };

        env.set(name, &value);
        promoted.push(name.to_string());
    }

    debug!(prefix = %prefix, promoted = ?promoted, "Promoted app settings");
    promoted
}
