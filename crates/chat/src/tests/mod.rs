//! Flow tests with in-memory completion and search services.
