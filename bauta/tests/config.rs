#![cfg(feature = "serde")]

use std::net::{IpAddr, Ipv6Addr};

use bauta::{Error, Family, FamilyMismatch, MaskSource, Masquerade, MasqueradeConfig, Stack};
use serde::Serialize;

#[test]
fn it_reads_an_empty_config_as_the_defaults() {
    let config: MasqueradeConfig = serde_json::from_str("{}").expect("should deserialize");
    assert_eq!(MasqueradeConfig::default(), config);
    assert_eq!(Stack::DualStack, config.build().unwrap().stack());
}

#[test]
fn it_reads_every_mask_source() {
    let config: MasqueradeConfig = serde_json::from_str(
        r#"{
            "ipv4": { "address": "255.255.255.0" },
            "ipv6": "default",
            "mask_non_routable": true
        }"#,
    )
    .expect("should deserialize");

    assert_eq!(
        Some(MaskSource::Address("255.255.255.0".parse().unwrap())),
        config.ipv4
    );
    assert_eq!(Some(MaskSource::Default), config.ipv6);

    let masquerade = config.build().unwrap();
    assert!(masquerade.masks_non_routable());
    let local: IpAddr = "192.168.1.1".parse().unwrap();
    assert_eq!("192.168.1.0", masquerade.mask(local).unwrap().to_string());
}

#[test]
fn it_disables_a_family_with_null() {
    let config: MasqueradeConfig =
        serde_json::from_str(r#"{ "ipv4": null, "family_mismatch": "passthrough" }"#)
            .expect("should deserialize");

    let masquerade = config.build().unwrap();
    assert_eq!(Stack::V6, masquerade.stack());
    assert_eq!(FamilyMismatch::Passthrough, masquerade.family_mismatch());

    let v4: IpAddr = "203.0.113.42".parse().unwrap();
    assert_eq!(v4, masquerade.mask_any(v4).unwrap());
}

#[test]
fn it_validates_deserialized_masks() {
    let config: MasqueradeConfig =
        serde_json::from_str(r#"{ "ipv6": { "prefix_len": 200 } }"#).expect("should deserialize");
    assert!(matches!(config.build(), Err(Error::InvalidArgument(_))));

    let config: MasqueradeConfig = serde_json::from_str(r#"{ "ipv4": { "octets": [255, 255] } }"#)
        .expect("should deserialize");
    assert!(matches!(config.build(), Err(Error::InvalidArgument(_))));
}

#[test]
fn it_round_trips() {
    let config = MasqueradeConfig::ipv4()
        .ipv4_prefix_len(16)
        .mask_non_routable(true);

    let json = serde_json::to_string(&config).expect("should serialize");
    assert_eq!(
        r#"{"ipv4":{"prefix_len":16},"ipv6":null,"family_mismatch":"reject","mask_non_routable":true}"#,
        json
    );

    let parsed: MasqueradeConfig = serde_json::from_str(&json).expect("should deserialize");
    assert_eq!(config, parsed);
}

#[test]
fn it_serializes_masked_addresses() {
    #[derive(Serialize)]
    struct Visit {
        peer: bauta::Masked<Ipv6Addr>,
    }

    let masquerade = Masquerade::default();
    let visit = Visit {
        peer: masquerade
            .masked("2001:db8:85a3::8a2e:370:7334".parse::<Ipv6Addr>().unwrap())
            .unwrap(),
    };

    assert_eq!(
        r#"{"peer":"2001:db8::"}"#,
        serde_json::to_string(&visit).expect("should serialize")
    );
    assert_eq!(
        Some(32),
        masquerade
            .bitmask(Family::V6)
            .and_then(|mask| mask.prefix_len())
    );
}
