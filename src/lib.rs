//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# emojilog

emojilog is a small logging facade built around two things: scoped diagnostic context, and
working out who is logging when nobody said.

# Scoped context

Every record carries a set of key/value pairs describing what the program was doing when it
was logged: a request id, a tenant, a job name. Those pairs live in a per-thread
*diagnostic context*, and [`ContextScope`](context::ContextScope) manages them for a block of work:
the pairs are applied on entry, and the context is put back exactly as it was on exit,
whether the work returns, fails or panics.

```rust
use emojilog::context::{self, ContextScope};

let order = ContextScope::new()
    .pair("requestId", "r1")
    .run(|| {
        assert_eq!(context::get("requestId").as_deref(), Some("r1"));
        42
    });
assert_eq!(order, 42);
assert_eq!(context::get("requestId"), None);
```

Async work is covered by [`ContextScope::run_async`](context::ContextScope::run_async) and
[`ContextScope::in_future`](context::ContextScope::in_future), which apply the pairs around every
poll so the context follows the task across threads instead of leaking into whatever else the
executor runs.

# Caller attribution

Code can log through a [`Log`] that was never given a name. Each call then asks a
[`CallerResolver`](caller::CallerResolver) to walk the stack past this crate, the standard library
and the async runtime, and names the record after the first application component it finds.
Handles are cached per component, and when attribution is off or fails the record goes to
the `"DEFAULT"` logger instead.

```rust
use emojilog::caller::{CallerResolver, ResolverConfig};
use emojilog::{Emit, Log};
use std::sync::Arc;

let resolver = Arc::new(CallerResolver::new(ResolverConfig::default()));
Log::unbound(resolver).info("whoever called this gets the credit");
Log::named("shop::Checkout").info("or say who you are up front");
```

# Sinks

Records go to a process-wide list of [`Sink`]s, by default a single [`StdErrorSink`].
[`InMemorySink`] captures records for tests.

# Configuration

[`Settings`] reads the resolver and startup options from the environment; see [`config`].
*/

mod level;
mod marker;
mod log_record;
mod sink;
pub mod global_sink;
mod inmemory_sink;
mod stderror_sink;
mod handle;
pub mod context;
pub mod caller;
pub mod config;
pub mod integration;

pub use level::Level;
pub use marker::Marker;
pub use log_record::LogRecord;
pub use sink::Sink;
pub use inmemory_sink::InMemorySink;
pub use stderror_sink::StdErrorSink;
pub use handle::{Emit, Log, LogHandle};
pub use config::{ConfigError, Settings};
pub use global_sink::{add_global_sink, set_global_sinks, global_sinks};
