use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use netsweep_common::vendors::UNKNOWN_VENDOR;
use netsweep_core::VendorRegistry;
use netsweep_core::update;

use crate::utils;

const IEEE_EXPORT: &str = "\
Registry,Assignment,Organization Name,Organization Address
MA-L,DC4BA1,Acme Corp,1 Main St
MA-L,00000C,\"Cisco Systems, Inc\",170 West Tasman Dr.
MA-L,,Missing,Nowhere
";

#[test]
fn lookups_during_reloads_never_see_a_mixed_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = utils::write_oui_csv(dir.path(), &[("DC4BA1", "Old A"), ("00000C", "Old B")]);
    let registry = Arc::new(VendorRegistry::new(&path));
    registry.ensure_loaded();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    let table = registry.snapshot();
                    let a = table.get("DC4BA1").map(String::as_str);
                    let b = table.get("00000C").map(String::as_str);
                    assert!(
                        matches!((a, b), (Some("Old A"), Some("Old B")) | (Some("New A"), Some("New B"))),
                        "mixed table: {a:?} {b:?}"
                    );
                }
            })
        })
        .collect();

    for round in 0..50 {
        let rows: &[(&str, &str)] = if round % 2 == 0 {
            &[("DC4BA1", "New A"), ("00000C", "New B")]
        } else {
            &[("DC4BA1", "Old A"), ("00000C", "Old B")]
        };
        update::install(csv_body(rows).as_bytes(), &path).unwrap();
        registry.reload().unwrap();
    }

    done.store(true, Ordering::Relaxed);
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn installed_ieee_export_is_served_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("oui.csv");
    let registry = VendorRegistry::new(&path);
    assert_eq!(registry.lookup("dc:4b:a1:00:00:01"), UNKNOWN_VENDOR);

    let rows = update::install(IEEE_EXPORT.as_bytes(), &path).unwrap();
    assert_eq!(rows, 2);
    assert!(update::reload_if_served(&path, &registry));

    assert_eq!(registry.lookup("dc:4b:a1:00:00:01"), "Acme Corp");
    assert_eq!(registry.lookup("00-00-0C-11-22-33"), "Cisco Systems, Inc");
}

fn csv_body(rows: &[(&str, &str)]) -> String {
    // Rewritten by the sanitizer into the canonical header.
    let mut body = String::from("Assignment,Organization Name\n");
    for (oui, org) in rows {
        body.push_str(&format!("{oui},{org}\n"));
    }
    body
}
