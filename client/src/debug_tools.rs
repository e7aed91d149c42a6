//! Diagnostics for native dev builds.
//!
//! Relocation cost and error are registered as Bevy diagnostics so they are logged next to
//! frame time, which makes the per-strategy cost visible while switching strategies.

use bevy::diagnostic::{
    Diagnostic, DiagnosticPath, Diagnostics, FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin,
    RegisterDiagnostic,
};
use bevy::prelude::*;

use crate::relocation::LastReport;

const APPLY_MICROS: DiagnosticPath = DiagnosticPath::const_new("relocation/apply_us");
const SETTLE_MICROS: DiagnosticPath = DiagnosticPath::const_new("relocation/settle_us");
const DISTANCE: DiagnosticPath = DiagnosticPath::const_new("relocation/distance_m");

/// Add debug/perf tooling (intended for `dev_native` builds only).
pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        LogDiagnosticsPlugin::default(),
    ));

    app.register_diagnostic(Diagnostic::new(APPLY_MICROS).with_suffix("us"));
    app.register_diagnostic(Diagnostic::new(SETTLE_MICROS).with_suffix("us"));
    app.register_diagnostic(Diagnostic::new(DISTANCE).with_suffix("m"));

    app.add_systems(Update, record_relocation);
}

fn record_relocation(mut diagnostics: Diagnostics, last_report: Res<LastReport>) {
    if !last_report.is_changed() {
        return;
    }
    let Some(report) = last_report.0 else {
        return;
    };
    diagnostics.add_measurement(&APPLY_MICROS, || report.apply_time.as_secs_f64() * 1.0e6);
    diagnostics.add_measurement(&SETTLE_MICROS, || report.settle_time.as_secs_f64() * 1.0e6);
    diagnostics.add_measurement(&DISTANCE, || f64::from(report.error.distance));
}
