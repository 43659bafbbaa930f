pub fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    //
    // For more details see
    // https://github.com/rustwasm/console_error_panic_hook#readme
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Log,
    Warn,
}

/// Buffer implementing `core::fmt::Write` for the logging macros. On wasm the text goes to the
/// browser console, elsewhere to stderr, since JS imports can't be called outside of wasm.
pub struct ConsoleWriter {
    buffer: String,
    level: Level,
}

impl ConsoleWriter {
    pub fn new(level: Level) -> Self {
        ConsoleWriter {
            buffer: String::new(),
            level,
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn flush_out(&mut self) {
        let message = wasm_bindgen::JsValue::from_str(&self.buffer);
        match self.level {
            Level::Log => web_sys::console::log_1(&message),
            Level::Warn => web_sys::console::warn_1(&message),
        }
        self.buffer.clear();
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn flush_out(&mut self) {
        match self.level {
            Level::Log => eprintln!("{}", self.buffer),
            Level::Warn => eprintln!("warning: {}", self.buffer),
        }
        self.buffer.clear();
    }
}

// Based on `wasm-glue` package
impl core::fmt::Write for ConsoleWriter {
    fn write_str(&mut self, st: &str) -> core::fmt::Result {
        self.buffer.push_str(st);
        Ok(())
    }
}

#[macro_export]
macro_rules! console_log {
    ($($arg:tt)*) => {{
        let mut console_writer = $crate::utils::ConsoleWriter::new($crate::utils::Level::Log);
        let _ = core::fmt::Write::write_fmt(&mut console_writer, format_args!($($arg)*));
        console_writer.flush_out();
    }};
}

#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {{
        let mut console_writer = $crate::utils::ConsoleWriter::new($crate::utils::Level::Warn);
        let _ = core::fmt::Write::write_fmt(&mut console_writer, format_args!($($arg)*));
        console_writer.flush_out();
    }};
}
