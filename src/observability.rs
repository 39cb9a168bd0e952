use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("safichat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("safichat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("safichat.client.request_duration_seconds");

pub(crate) static SESSION_VALIDATIONS: Counter = Counter::new("safichat.session.validations");
pub(crate) static SESSION_REDIRECTS: Counter = Counter::new("safichat.session.redirects");

pub(crate) static DISPATCH_SENT: Counter = Counter::new("safichat.dispatch.sent");
pub(crate) static DISPATCH_UPLOADS: Counter = Counter::new("safichat.dispatch.uploads");
pub(crate) static DISPATCH_CANCELLED: Counter = Counter::new("safichat.dispatch.cancelled");
pub(crate) static DISPATCH_FAILED: Counter = Counter::new("safichat.dispatch.failed");

pub(crate) static POLLS: Counter = Counter::new("safichat.poller.polls");
pub(crate) static POLL_ERRORS: Counter = Counter::new("safichat.poller.errors");

pub(crate) static GROUP_LOADS: Counter = Counter::new("safichat.group.loads");
pub(crate) static GROUP_LOAD_ERRORS: Counter = Counter::new("safichat.group.load_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_VALIDATIONS);
    collector.register_counter(&SESSION_REDIRECTS);

    collector.register_counter(&DISPATCH_SENT);
    collector.register_counter(&DISPATCH_UPLOADS);
    collector.register_counter(&DISPATCH_CANCELLED);
    collector.register_counter(&DISPATCH_FAILED);

    collector.register_counter(&POLLS);
    collector.register_counter(&POLL_ERRORS);

    collector.register_counter(&GROUP_LOADS);
    collector.register_counter(&GROUP_LOAD_ERRORS);
}
