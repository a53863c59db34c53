//! Gateway reference resolution.
//!
//! A VirtualService names its gateways with free-form strings. Four spellings
//! are in circulation:
//!
//! | Reference                                 | Resolves to                 |
//! |-------------------------------------------|-----------------------------|
//! | `public-gw`                               | `<own namespace>/public-gw` |
//! | `./public-gw`                             | `<own namespace>/public-gw` |
//! | `shared-gw.istio-system.svc.cluster.local`| `istio-system/shared-gw`    |
//! | `shared-gw.istio-system`                  | `istio-system/shared-gw`    |
//!
//! Any other `prefix/name` reference is kept whole as a name in the
//! referencing namespace, so `kube-system/main-gw` resolves to
//! `<own namespace>/kube-system/main-gw`. Existing bindings depend on that.

use crds::ScopedIdentity;

/// Sentinel namespace meaning "the referencing object's namespace".
const CURRENT_NAMESPACE: &str = ".";

/// Resolve a raw gateway reference into a canonical identity.
///
/// `default_namespace` is the namespace of the referencing VirtualService.
/// Never fails: anything that cannot be parsed is treated as a plain name in
/// `default_namespace`.
pub fn resolve_gateway_name(raw: &str, default_namespace: &str) -> ScopedIdentity {
    match raw.split_once('/') {
        Some((CURRENT_NAMESPACE, name)) => ScopedIdentity::new(default_namespace, name),
        Some(_) => ScopedIdentity::new(default_namespace, raw),
        None => match raw.split_once('.') {
            // Legacy FQDN: name.namespace.svc.cluster.local -> namespace/name
            Some((name, rest)) => {
                let namespace = rest.split_once('.').map_or(rest, |(namespace, _)| namespace);
                ScopedIdentity::new(namespace, name)
            }
            None => ScopedIdentity::new(default_namespace, raw),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(namespace: &str, name: &str) -> ScopedIdentity {
        ScopedIdentity::new(namespace, name)
    }

    #[test]
    fn test_short_name_uses_default_namespace() {
        assert_eq!(resolve_gateway_name("public-gw", "default"), id("default", "public-gw"));
    }

    #[test]
    fn test_current_namespace_prefix() {
        assert_eq!(resolve_gateway_name("./public-gw", "sales"), id("sales", "public-gw"));
    }

    #[test]
    fn test_current_namespace_prefix_keeps_remaining_slashes() {
        assert_eq!(resolve_gateway_name("./a/b", "sales"), id("sales", "a/b"));
    }

    #[test]
    fn test_legacy_fqdn() {
        assert_eq!(
            resolve_gateway_name("prod-gw.istio-system.svc.cluster.local", "sales"),
            id("istio-system", "prod-gw")
        );
    }

    #[test]
    fn test_legacy_name_dot_namespace() {
        assert_eq!(
            resolve_gateway_name("prod-gw.istio-system", "sales"),
            id("istio-system", "prod-gw")
        );
    }

    #[test]
    fn test_namespace_slash_name_is_kept_whole() {
        assert_eq!(
            resolve_gateway_name("kube-system/main-gw", "default"),
            id("default", "kube-system/main-gw")
        );
    }

    #[test]
    fn test_slash_takes_precedence_over_dot() {
        assert_eq!(
            resolve_gateway_name("./gw.istio-system", "default"),
            id("default", "gw.istio-system")
        );
        assert_eq!(
            resolve_gateway_name("istio-system/gw.x", "default"),
            id("default", "istio-system/gw.x")
        );
    }

    #[test]
    fn test_degenerate_dots() {
        assert_eq!(resolve_gateway_name("gw.", "default"), id("", "gw"));
        assert_eq!(resolve_gateway_name(".istio-system", "default"), id("istio-system", ""));
        assert_eq!(resolve_gateway_name("gw..svc", "default"), id("", "gw"));
    }

    #[test]
    fn test_non_ascii_input_does_not_panic() {
        assert_eq!(resolve_gateway_name("пш.ns", "default"), id("ns", "пш"));
        assert_eq!(resolve_gateway_name("ゲート", "default"), id("default", "ゲート"));
    }

    proptest! {
        #[test]
        fn prop_short_names_resolve_in_default_namespace(
            name in "[a-z0-9][a-z0-9-]{0,30}",
            namespace in "[a-z0-9][a-z0-9-]{0,30}",
        ) {
            prop_assert_eq!(resolve_gateway_name(&name, &namespace), id(&namespace, &name));
        }

        #[test]
        fn prop_dot_slash_resolves_in_default_namespace(
            name in "[a-z0-9][a-z0-9.-]{0,30}",
            namespace in "[a-z0-9][a-z0-9-]{0,30}",
        ) {
            let raw = format!("./{name}");
            prop_assert_eq!(resolve_gateway_name(&raw, &namespace), id(&namespace, &name));
        }

        #[test]
        fn prop_legacy_forms_ignore_default_namespace(
            name in "[a-z0-9][a-z0-9-]{0,30}",
            gateway_namespace in "[a-z0-9][a-z0-9-]{0,30}",
            own_namespace in "[a-z0-9][a-z0-9-]{0,30}",
        ) {
            let fqdn = format!("{name}.{gateway_namespace}.svc.cluster.local");
            prop_assert_eq!(
                resolve_gateway_name(&fqdn, &own_namespace),
                id(&gateway_namespace, &name)
            );

            let short = format!("{name}.{gateway_namespace}");
            prop_assert_eq!(
                resolve_gateway_name(&short, &own_namespace),
                id(&gateway_namespace, &name)
            );
        }

        #[test]
        fn prop_resolution_is_deterministic(raw in "\\PC{1,40}", namespace in "[a-z]{1,10}") {
            prop_assert_eq!(
                resolve_gateway_name(&raw, &namespace),
                resolve_gateway_name(&raw, &namespace)
            );
        }
    }
}
