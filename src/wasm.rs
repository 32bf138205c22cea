//! Browser builds: route panics to the console instead of the default silent `abort`.

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}
