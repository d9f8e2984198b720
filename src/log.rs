/// Evaluates an expression and reports its running time at debug level.
macro_rules! measure {
    ($code:expr) => {{
        let start = ::std::time::Instant::now();
        ::tracing::trace!(code = stringify!($code), "measuring...");
        let result = $code;

        ::tracing::debug!(
            milliseconds = start.elapsed().as_secs_f64() * 1000.0,
            code = stringify!($code),
            "measured"
        );

        result
    }};
}

pub(crate) use measure;
