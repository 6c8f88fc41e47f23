use std::sync::Arc;
use std::sync::atomic::Ordering;

use hostprof_config::{ConfigTable, MapSource, NeverReload, ReloadOutcome, SettingId};
use hostprof_ext::{
    Export, ExtensionConfig, ExtensionInfo, FunctionTable, HostAbi, InProcessHost, ModuleEntry,
    ProfilerExtension, ProfilingContext, StaticRegistry,
};

fn tracer_context() -> ProfilingContext {
    ProfilingContext {
        local_root_span_id: 0x1234,
        span_id: 0x5678,
    }
}

fn tracer_module() -> ModuleEntry {
    ModuleEntry::new("ddtrace", "1.4.0").with_export(
        "ddtrace_get_profiling_context",
        Export::ProfilingContext(tracer_context),
    )
}

fn host(registry: StaticRegistry) -> InProcessHost {
    InProcessHost::new(registry, FunctionTable::new())
}

#[test]
fn startup_resolves_companion_and_memoizes_config() -> anyhow::Result<()> {
    let source = MapSource::from_pairs("test", [("DD_SERVICE", "billing")]);
    let extension = ProfilerExtension::new(host(StaticRegistry::new().with(tracer_module())), source);

    extension.startup(&ExtensionInfo::default())?;

    assert!(extension.context_resolved());
    assert_eq!(extension.profiling_context(), tracer_context());
    let table = extension.table();
    for (def, entry) in table.snapshot() {
        assert!(entry.is_set, "{} not memoized at startup", def.getter);
    }
    assert_eq!(table.string(SettingId::Service).as_deref(), Some("billing"));
    Ok(())
}

#[test]
fn absent_companion_yields_zero_context_forever() -> anyhow::Result<()> {
    let extension = ProfilerExtension::new(host(StaticRegistry::new()), MapSource::new("test"));
    extension.startup(&ExtensionInfo::default())?;

    for _ in 0..100 {
        assert_eq!(extension.profiling_context(), ProfilingContext::default());
    }
    // A second startup cannot swap the supplier in later.
    extension.startup(&ExtensionInfo::default())?;
    assert_eq!(extension.profiling_context(), ProfilingContext::default());
    Ok(())
}

#[test]
fn companion_without_export_is_not_fatal() -> anyhow::Result<()> {
    let registry = StaticRegistry::new().with(ModuleEntry::new("ddtrace", "0.9.0"));
    let extension = ProfilerExtension::new(host(registry), MapSource::new("test"));
    extension.startup(&ExtensionInfo::default())?;
    assert_eq!(extension.profiling_context(), ProfilingContext::default());
    Ok(())
}

#[test]
fn companion_name_is_configurable() -> anyhow::Result<()> {
    let registry = StaticRegistry::new().with(
        ModuleEntry::new("tracer", "2.0.0")
            .with_export("tracer_context", Export::ProfilingContext(tracer_context)),
    );
    let extension = ProfilerExtension::new(host(registry), MapSource::new("test")).with_config(
        ExtensionConfig {
            companion_module: "tracer".to_string(),
            context_symbol: "tracer_context".to_string(),
        },
    );
    extension.startup(&ExtensionInfo::default())?;
    assert_eq!(extension.profiling_context(), tracer_context());
    Ok(())
}

#[test]
fn lookup_module_reports_absence() {
    let extension = ProfilerExtension::new(
        host(StaticRegistry::new().with(tracer_module())),
        MapSource::new("test"),
    );
    assert!(extension.lookup_module(b"ddtrace").is_some());
    for name in [&b""[..], &b"dd"[..], &b"ddtrace "[..], &b"\x00"[..], &b"\xff\xfe"[..]] {
        assert_eq!(extension.lookup_module(name), None, "{name:?}");
    }
}

#[test]
fn version_change_reloads_shared_table() -> anyhow::Result<()> {
    let source = Arc::new(MapSource::from_pairs("test", [("DD_VERSION", "1.0.0")]));
    let table = Arc::new(ConfigTable::new());
    let extension = ProfilerExtension::new(host(StaticRegistry::new()), Arc::clone(&source))
        .with_table(Arc::clone(&table));
    extension.startup(&ExtensionInfo::default())?;

    source.set("DD_VERSION", "1.1.0");
    assert_eq!(
        extension.on_version_change(Some("1.0.0"), "1.0.0")?,
        ReloadOutcome::Skipped
    );
    assert_eq!(table.string(SettingId::Version).as_deref(), Some("1.0.0"));

    assert_eq!(
        extension.on_version_change(Some("1.0.0"), "1.1.0")?,
        ReloadOutcome::Reloaded
    );
    assert_eq!(table.string(SettingId::Version).as_deref(), Some("1.1.0"));
    Ok(())
}

#[test]
fn reload_policy_is_injectable() -> anyhow::Result<()> {
    let source = Arc::new(MapSource::from_pairs("test", [("DD_ENV", "staging")]));
    let extension = ProfilerExtension::new(host(StaticRegistry::new()), Arc::clone(&source))
        .with_policy(NeverReload);
    extension.startup(&ExtensionInfo::default())?;

    source.set("DD_ENV", "prod");
    assert_eq!(
        extension.on_version_change(None, "2.0.0")?,
        ReloadOutcome::Skipped
    );
    assert_eq!(extension.table().string(SettingId::Env).as_deref(), Some("staging"));
    Ok(())
}

#[test]
fn interrupt_address_belongs_to_calling_thread() {
    let extension = Arc::new(ProfilerExtension::new(
        host(StaticRegistry::new()),
        MapSource::new("test"),
    ));
    let here = extension.vm_interrupt_address();
    assert_eq!(here, extension.vm_interrupt_address());

    // SAFETY: the flag belongs to this thread, which outlives the reference.
    let flag = unsafe { here.as_ref() };
    flag.store(true, Ordering::SeqCst);

    let remote = Arc::clone(&extension);
    let seen_elsewhere = std::thread::spawn(move || {
        let there = remote.vm_interrupt_address();
        // SAFETY: as above, for the spawned thread.
        unsafe { there.as_ref() }.load(Ordering::SeqCst)
    })
    .join()
    .unwrap();
    assert!(!seen_elsewhere);
    flag.store(false, Ordering::SeqCst);
}

#[test]
fn build_ids_are_constant() {
    let extension = ProfilerExtension::new(host(StaticRegistry::new()), MapSource::new("test"));
    assert_eq!(extension.extension_build_id(), hostprof_ext::extension_build_id());
    assert_eq!(extension.module_build_id(), hostprof_ext::module_build_id());
    assert!(extension.extension_build_id().starts_with("API"));
}
