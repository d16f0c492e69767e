// ─── thinjar Core ───
//
// Launch pipeline for thin Java archives, in dependency order:
//
//   config      startup configuration with layered precedence
//   error       central error taxonomy
//   http        shared HTTP client construction
//   downloader  blocking, cache-aware file downloads
//   archive     jar and exploded-directory access
//   descriptor  thin.properties loading and merging
//   maven       coordinates, POMs and the dependency resolver
//   locator     symbolic archive references
//   classpath   ordered classpath assembly
//   loader      resource lookup with delegation policy
//   java        runtime discovery
//   launch      run modes and JVM spawning

pub mod archive;
pub mod classpath;
pub mod config;
pub mod descriptor;
pub mod downloader;
pub mod error;
pub mod http;
pub mod java;
pub mod launch;
pub mod loader;
pub mod locator;
pub mod maven;
