//! The advisory rule table.
//!
//! Order in the table is the tie-break between equal priorities.

use super::{AdvisoryContext, GuideKind};
use crate::domain::{Decision, RiskLevel};
use crate::session::Session;

/// Text of a candidate, fixed per rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideTemplate {
    pub title: &'static str,
    pub now: &'static str,
    pub because: &'static str,
    pub next: &'static str,
    pub kind: GuideKind,
}

/// One guard over the advisory context with the guidance it produces.
#[derive(Clone, Copy)]
pub struct Rule {
    pub tag: &'static str,
    pub priority: u8,
    pub applies: fn(&AdvisoryContext) -> bool,
    pub template: GuideTemplate,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("tag", &self.tag)
            .field("priority", &self.priority)
            .finish()
    }
}

const TITLE: &str = "Guía de la Estrella";

fn observing(ctx: &AdvisoryContext) -> bool {
    ctx.decision == Decision::Observe
}

fn risk_at_least(ctx: &AdvisoryContext, level: RiskLevel) -> bool {
    ctx.risk >= level
}

pub const RULES: &[Rule] = &[
    Rule {
        tag: "estructura_ok_intencion_no_clara",
        priority: 2,
        applies: |ctx| {
            observing(ctx) && ctx.indicators.structure_valid && ctx.indicators.intent_unclear
        },
        template: GuideTemplate {
            title: TITLE,
            now: "Ahora: Mantente en OBSERVAR.",
            because: "La estructura es válida, pero todavía no hay intención. Entrar aquí es adivinar.",
            next: "Próximo paso: espera confirmación (cierre claro + ruptura/rechazo) antes de considerar operar.",
            kind: GuideKind::Reading,
        },
    },
    Rule {
        tag: "fuera_sesion_proteccion",
        priority: 1,
        applies: |ctx| {
            ctx.session == Some(Session::OffHours)
                && matches!(ctx.decision, Decision::Observe | Decision::DoNotTrade)
        },
        template: GuideTemplate {
            title: TITLE,
            now: "Ahora: Mantente en OBSERVAR.",
            because: "Fuera de sesión la calidad baja y el ruido sube. No hay prisa.",
            next: "Próximo paso: vuelve en sesión principal y busca confirmación limpia.",
            kind: GuideKind::Protection,
        },
    },
    Rule {
        tag: "observar_impulsividad",
        priority: 1,
        applies: |ctx| {
            observing(ctx) && risk_at_least(ctx, RiskLevel::Moderate) && ctx.memory.impulsive
        },
        template: GuideTemplate {
            title: TITLE,
            now: "Ahora: Observa sin intervenir.",
            because: "Este es el contexto donde tu mente suele apurarse. Hoy el control es ventaja.",
            next: "Próximo paso: espera una vela de confirmación antes de considerar operar.",
            kind: GuideKind::Discipline,
        },
    },
    Rule {
        tag: "no_operar_riesgo_alto",
        priority: 1,
        applies: |ctx| ctx.decision == Decision::DoNotTrade && risk_at_least(ctx, RiskLevel::High),
        template: GuideTemplate {
            title: TITLE,
            now: "Ahora: NO OPERAR.",
            because: "El riesgo alto no se negocia. Proteger capital también es progreso.",
            next: "Próximo paso: espera que el riesgo baje o que el contexto se ordene.",
            kind: GuideKind::Protection,
        },
    },
    Rule {
        tag: "rsi_neutral_memoria",
        priority: 2,
        applies: |ctx| {
            observing(ctx)
                && ctx.momentum.is_some_and(|m| (40.0..=60.0).contains(&m))
                && ctx.memory.enters_without_confirmation
        },
        template: GuideTemplate {
            title: TITLE,
            now: "Ahora: OBSERVAR en neutral.",
            because: "En RSI neutral tu error típico es anticipar. Aquí se pierde por impaciencia.",
            next: "Próximo paso: espera salida de neutral + estructura clara.",
            kind: GuideKind::Correction,
        },
    },
    Rule {
        tag: "ema200_lectura",
        priority: 3,
        applies: |ctx| observing(ctx) && ctx.indicators.near_slow_ema,
        template: GuideTemplate {
            title: TITLE,
            now: "Ahora: Lee reacción en EMA 200.",
            because: "EMA 200 suele actuar como zona de decisión. No se adivina: se observa.",
            next: "Próximo paso: confirma rechazo/ruptura con velas antes de actuar.",
            kind: GuideKind::Reading,
        },
    },
    Rule {
        tag: "bollinger_lectura",
        priority: 3,
        applies: |ctx| observing(ctx) && ctx.indicators.near_band,
        template: GuideTemplate {
            title: TITLE,
            now: "Ahora: No operes por tocar banda.",
            because: "Bollinger no es señal por sí sola. El contexto manda, no el borde.",
            next: "Próximo paso: espera compresión/expansión + confirmación.",
            kind: GuideKind::Reading,
        },
    },
    Rule {
        tag: "operar_disciplina",
        priority: 2,
        applies: |ctx| {
            ctx.decision == Decision::TradeWithDiscipline
                && ctx.indicators.structure_confirmed
                && ctx.risk == RiskLevel::Low
        },
        template: GuideTemplate {
            title: TITLE,
            now: "Ahora: Ejecuta con disciplina.",
            because: "La ventaja no está en entrar, está en gestionar el riesgo y respetar el plan.",
            next: "Próximo paso: define invalidación y tamaño antes de la entrada.",
            kind: GuideKind::Execution,
        },
    },
    Rule {
        tag: "sesion_baja_sobreoperar",
        priority: 2,
        applies: |ctx| {
            observing(ctx)
                && risk_at_least(ctx, RiskLevel::Moderate)
                && ctx.memory.overtrades_low_session
        },
        template: GuideTemplate {
            title: TITLE,
            now: "Ahora: Mantén la calma.",
            because: "En horarios de baja calidad tu historial muestra sobreoperación.",
            next: "Próximo paso: limita intentos o espera mejor sesión.",
            kind: GuideKind::Protection,
        },
    },
];
