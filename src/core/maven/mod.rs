mod artifact;
mod pom;
mod resolver;

pub use artifact::MavenArtifact;
pub use pom::{Pom, PomDep};
pub use resolver::{DependencyManagement, DependencyResolver, MavenResolver};

/// Default repository searched when the descriptor declares none.
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";
/// Spring's release repository, a common secondary source for thin archives.
pub const SPRING_RELEASE: &str = "https://repo.spring.io/release";

/// Repository set used when no `repositories` override is declared.
pub fn default_repositories() -> Vec<String> {
    vec![MAVEN_CENTRAL.to_string(), SPRING_RELEASE.to_string()]
}
