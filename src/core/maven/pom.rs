use quick_xml::de::from_str;
use serde::Deserialize;

use crate::core::error::{LauncherError, LauncherResult};

/// Minimal POM model: only the sections needed to walk the dependency
/// graph. Everything else in the document is ignored on deserialization.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pom {
    #[serde(default)]
    dependencies: Option<PomDeps>,
    #[serde(default)]
    dependency_management: Option<PomDepManagement>,
}

#[derive(Debug, Deserialize, Default)]
struct PomDeps {
    #[serde(default, rename = "dependency")]
    items: Vec<PomDep>,
}

#[derive(Debug, Deserialize, Default)]
struct PomDepManagement {
    #[serde(default)]
    dependencies: Option<PomDeps>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PomDep {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub optional: Option<bool>,
    #[serde(rename = "type", default)]
    pub dep_type: Option<String>,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default)]
    pub exclusions: Option<PomExclusions>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PomExclusions {
    #[serde(default, rename = "exclusion")]
    pub items: Vec<PomExclusion>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PomExclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Pom {
    pub fn parse(xml: &str) -> LauncherResult<Self> {
        from_str(xml).map_err(|e| LauncherError::PomParse(e.to_string()))
    }

    /// Dependencies that belong on a runtime classpath: compile and runtime
    /// scope, non-optional. Test/provided/system scopes never ship.
    pub fn classpath_dependencies(&self) -> Vec<PomDep> {
        let Some(deps) = &self.dependencies else {
            return vec![];
        };
        deps.items
            .iter()
            .filter(|d| {
                let scope = d.scope.as_deref().unwrap_or("compile");
                let optional = d.optional.unwrap_or(false);
                (scope == "compile" || scope == "runtime") && !optional
            })
            .cloned()
            .collect()
    }

    /// Version for a dependency that declares none, taken from this POM's
    /// own `dependencyManagement` section.
    pub fn managed_version(&self, group_id: &str, artifact_id: &str) -> Option<String> {
        let managed = self
            .dependency_management
            .as_ref()?
            .dependencies
            .as_ref()?;
        managed
            .items
            .iter()
            .find(|m| m.group_id == group_id && m.artifact_id == artifact_id)
            .and_then(|m| m.version.clone())
    }
}

impl PomDep {
    /// Excluded `group:artifact` keys declared on this dependency.
    pub fn exclusion_keys(&self) -> Vec<String> {
        self.exclusions
            .as_ref()
            .map(|e| {
                e.items
                    .iter()
                    .map(|x| format!("{}:{}", x.group_id, x.artifact_id))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scopes_and_optionals() {
        let xml = r#"
        <project>
            <groupId>com.example</groupId>
            <artifactId>demo</artifactId>
            <version>1.0</version>
            <dependencies>
                <dependency>
                    <groupId>com.example</groupId>
                    <artifactId>core</artifactId>
                    <version>1.0</version>
                </dependency>
                <dependency>
                    <groupId>com.example</groupId>
                    <artifactId>driver</artifactId>
                    <version>2.0</version>
                    <scope>runtime</scope>
                </dependency>
                <dependency>
                    <groupId>junit</groupId>
                    <artifactId>junit</artifactId>
                    <version>4.13</version>
                    <scope>test</scope>
                </dependency>
                <dependency>
                    <groupId>com.example</groupId>
                    <artifactId>extras</artifactId>
                    <version>1.0</version>
                    <optional>true</optional>
                </dependency>
            </dependencies>
        </project>
        "#;
        let pom = Pom::parse(xml).unwrap();
        let deps = pom.classpath_dependencies();
        let ids: Vec<&str> = deps.iter().map(|d| d.artifact_id.as_str()).collect();
        assert_eq!(ids, vec!["core", "driver"]);
    }

    #[test]
    fn managed_version_lookup() {
        let xml = r#"
        <project>
            <dependencyManagement>
                <dependencies>
                    <dependency>
                        <groupId>com.example</groupId>
                        <artifactId>core</artifactId>
                        <version>3.1</version>
                    </dependency>
                </dependencies>
            </dependencyManagement>
            <dependencies>
                <dependency>
                    <groupId>com.example</groupId>
                    <artifactId>core</artifactId>
                </dependency>
            </dependencies>
        </project>
        "#;
        let pom = Pom::parse(xml).unwrap();
        assert_eq!(
            pom.managed_version("com.example", "core").as_deref(),
            Some("3.1")
        );
        assert_eq!(pom.managed_version("com.example", "other"), None);
    }

    #[test]
    fn exclusion_keys_flattened() {
        let xml = r#"
        <project>
            <dependencies>
                <dependency>
                    <groupId>com.example</groupId>
                    <artifactId>core</artifactId>
                    <version>1.0</version>
                    <exclusions>
                        <exclusion>
                            <groupId>commons-logging</groupId>
                            <artifactId>commons-logging</artifactId>
                        </exclusion>
                    </exclusions>
                </dependency>
            </dependencies>
        </project>
        "#;
        let pom = Pom::parse(xml).unwrap();
        let deps = pom.classpath_dependencies();
        assert_eq!(
            deps[0].exclusion_keys(),
            vec!["commons-logging:commons-logging"]
        );
    }
}
