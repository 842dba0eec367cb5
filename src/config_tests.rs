// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::errors::ConfigError;
    use clap::Parser;
    use std::net::SocketAddr;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["dnsportal"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);

        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.dns_timeout(), Duration::from_secs(5));
        assert_eq!(config.stream_buffer, 64);
        assert!(config.watch_namespace.is_none());
        assert!(config.namespace_groups.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_group_mapping_from_flags() {
        let config = parse(&[
            "--default-group",
            "Platform",
            "--group-label-key",
            "team",
            "--namespace-group",
            "shop=Storefront",
            "--namespace-group",
            "billing = Finance,ops=Operations",
        ]);

        let mapping = config.group_mapping().unwrap();
        assert_eq!(mapping.default_group, "Platform");
        assert_eq!(mapping.label_key.as_deref(), Some("team"));
        assert_eq!(mapping.by_namespace.get("shop").map(String::as_str), Some("Storefront"));
        assert_eq!(mapping.by_namespace.get("billing").map(String::as_str), Some("Finance"));
        assert_eq!(mapping.by_namespace.get("ops").map(String::as_str), Some("Operations"));
    }

    #[test]
    fn test_invalid_namespace_group() {
        for bad in ["shop", "=Storefront", "shop="] {
            let config = parse(&["--namespace-group", bad]);
            assert_eq!(
                config.group_mapping(),
                Err(ConfigError::InvalidNamespaceGroup(bad.to_string()))
            );
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_zero_refresh_interval_is_rejected() {
        let config = parse(&["--refresh-interval-secs", "0"]);
        assert_eq!(config.validate(), Err(ConfigError::InvalidRefreshInterval));
    }

    #[test]
    fn test_nameserver_addr() {
        let with_port = parse(&["--nameserver", "10.96.0.10:5353"]);
        assert_eq!(
            with_port.nameserver_addr().unwrap(),
            "10.96.0.10:5353".parse::<SocketAddr>().unwrap()
        );

        let bare_ip = parse(&["--nameserver", "2001:db8::53"]);
        assert_eq!(
            bare_ip.nameserver_addr().unwrap(),
            "[2001:db8::53]:53".parse::<SocketAddr>().unwrap()
        );

        let bad = parse(&["--nameserver", "dns.example.com"]);
        assert_eq!(
            bad.nameserver_addr(),
            Err(ConfigError::InvalidNameserver("dns.example.com".to_string()))
        );
    }

    #[test]
    fn test_unset_nameserver_uses_system_resolver() {
        let config = parse(&[]);
        assert!(config.nameserver_addr().is_ok());
    }
}
