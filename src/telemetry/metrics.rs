use once_cell::sync::Lazy;
use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};

pub static METER: Lazy<Meter> = Lazy::new(|| global::meter("conduit"));

pub static HTTP_REQUESTS_TOTAL: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("http.server.requests")
        .with_description("Total HTTP requests served")
        .build()
});

pub static HTTP_REQUEST_DURATION: Lazy<Histogram<f64>> = Lazy::new(|| {
    METER
        .f64_histogram("http.server.request.duration")
        .with_description("HTTP request latency")
        .with_unit("s")
        .build()
});

pub static USERS_REGISTERED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("users.registered")
        .with_description("Total users registered")
        .build()
});

pub static FOLLOWS_ADDED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("follows.added")
        .with_description("Total follow relations created")
        .build()
});

pub static FOLLOWS_REMOVED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("follows.removed")
        .with_description("Total follow relations removed")
        .build()
});

pub static ARTICLES_CREATED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("articles.created")
        .with_description("Total articles created")
        .build()
});

pub static ARTICLES_UPDATED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("articles.updated")
        .with_description("Total articles updated")
        .build()
});

pub static ARTICLES_DELETED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("articles.deleted")
        .with_description("Total articles deleted")
        .build()
});

pub static FAVORITES_ADDED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("favorites.added")
        .with_description("Total favorites added")
        .build()
});

pub static FAVORITES_REMOVED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("favorites.removed")
        .with_description("Total favorites removed")
        .build()
});

pub static COMMENTS_CREATED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("comments.created")
        .with_description("Total comments created")
        .build()
});

pub static COMMENTS_DELETED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("comments.deleted")
        .with_description("Total comments deleted")
        .build()
});
