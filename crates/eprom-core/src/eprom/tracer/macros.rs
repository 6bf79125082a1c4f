#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn __record(phase: super::Phase, args: std::fmt::Arguments) {
    if let Ok(mut tracer) = crate::eprom::tracer::TRACER.lock() {
        tracer.record(phase, args.to_string());
    }
}

#[macro_export]
macro_rules! trace_boot {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            $crate::eprom::tracer::macros::__record(
                $crate::eprom::tracer::Phase::Boot,
                format_args!($($arg)*),
            );
        }
    };
}

#[macro_export]
macro_rules! trace_load_event {
    ($phase:ident, $($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            $crate::eprom::tracer::macros::__record(
                $crate::eprom::tracer::Phase::$phase,
                format_args!($($arg)*),
            );
        }
    };
}

#[macro_export]
macro_rules! trace_obj {
    ($obj:expr) => {
        #[cfg(feature = "tracing")]
        {
            if let Ok(mut tracer) = $crate::eprom::tracer::TRACER.lock() {
                tracer.log($obj);
            }
        }
    };
}

#[macro_export]
macro_rules! trace_dump {
    () => {
        #[cfg(feature = "tracing")]
        {
            if let Ok(tracer) = $crate::eprom::tracer::TRACER.lock() {
                tracer.print();
            }
        }
    };
}
