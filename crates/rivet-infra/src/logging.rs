// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logger initialisation for binaries and tests.

use env_logger::{Builder, Env};

/// Installs the global logger, honouring `RUST_LOG` and falling back to `default_filter`.
///
/// Calling it again after a logger is installed does nothing, so every test may call it.
pub fn init_logging(default_filter: &str) {
    let result = Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .is_test(cfg!(test))
        .try_init();

    if result.is_ok() {
        log::debug!("Logger initialised with default filter '{default_filter}'.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_logging("debug");
        init_logging("trace");
        log::info!("still logging");
    }
}
