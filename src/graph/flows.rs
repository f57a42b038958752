//! Built-in scripted flows
//!
//! `acolhimento` is the general-distress flow opened from the home menu.
//! `crise` is the acute-anxiety branch, entered directly from the panic
//! shortcut. Both share the breathing and grounding nodes; only where the
//! closing choices lead back to differs.

use super::{ConversationGraph, ConversationNode, GraphError, SideEffect};

pub const ACOLHIMENTO: &str = "acolhimento";
pub const CRISE: &str = "crise";

pub const INITIAL: &str = "initial";
pub const CRISE_ANSIEDADE: &str = "criseAnsiedade";
pub const CRISE_RESPIRACAO: &str = "criseRespiracao";
pub const TECNICA_5_SENTIDOS: &str = "tecnica5sentidos";
pub const CALMA: &str = "calma";
pub const ENCERRAMENTO: &str = "encerramento";
pub const FINALIZADO: &str = "finalizado";
pub const LIGAR_CVV: &str = "ligarCVV";

/// General distress flow, starting at `initial`
pub fn acolhimento() -> Result<ConversationGraph, GraphError> {
    let mut nodes = vec![
        ConversationNode::new(INITIAL, "Olá! Do que você precisa?")
            .choice("Quero conversar sobre como estou me sentindo", "sentimentos")
            .choice("Estou tendo uma crise de ansiedade", CRISE_ANSIEDADE),
        ConversationNode::new("sentimentos", "Como você está se sentindo hoje?")
            .choice("Triste", "tristeza")
            .choice("Ansioso(a)", CRISE_ANSIEDADE)
            .choice("Sozinho(a)", "solidao")
            .choice("Com pensamentos de me machucar", "risco"),
        ConversationNode::new(
            "tristeza",
            "Sinto muito que você esteja triste. Quer tentar um exercício que pode ajudar?",
        )
        .choice("Sim, quero tentar", "gratidao")
        .choice("Prefiro falar com alguém", LIGAR_CVV),
        ConversationNode::new(
            "gratidao",
            "Pense em três coisas, mesmo pequenas, pelas quais você é grato(a) hoje. \
             Se quiser, anote-as no seu diário.",
        )
        .choice("Pensei nelas", ENCERRAMENTO)
        .choice("Não consegui pensar em nada", CALMA),
        ConversationNode::new(
            "solidao",
            "Sentir-se sozinho(a) é muito difícil. Que tal mandar uma mensagem para \
             alguém de confiança agora?",
        )
        .choice("Vou falar com alguém", ENCERRAMENTO)
        .choice("Quero conversar com um voluntário do CVV", LIGAR_CVV),
        ConversationNode::new(
            "risco",
            "Sua vida é importante. Por favor, fale agora com o CVV, que atende 24 horas \
             pelo telefone 188, de forma gratuita e sigilosa.",
        )
        .choice("Ligar para o CVV", LIGAR_CVV)
        .choice("Estou em segurança por enquanto", ENCERRAMENTO),
    ];
    nodes.extend(shared_nodes(INITIAL));

    ConversationGraph::new(ACOLHIMENTO, INITIAL, nodes)
}

/// Acute-anxiety de-escalation, starting at `criseAnsiedade`
pub fn crise() -> Result<ConversationGraph, GraphError> {
    ConversationGraph::new(CRISE, CRISE_ANSIEDADE, shared_nodes(CRISE_ANSIEDADE))
}

/// Anxiety, grounding and closing nodes. `home` is where "start over" leads.
fn shared_nodes(home: &str) -> Vec<ConversationNode> {
    vec![
        ConversationNode::new(
            CRISE_ANSIEDADE,
            "Entendo. Vamos passar por isso juntos. Você consegue respirar comigo agora?",
        )
        .choice("Sim, vamos tentar", CRISE_RESPIRACAO)
        .choice("Não consigo, preciso de ajuda urgente", LIGAR_CVV),
        ConversationNode::new(
            CRISE_RESPIRACAO,
            "Inspire pelo nariz contando até 4, segure por 4 segundos e solte pela boca \
             contando até 6. Repita algumas vezes. Como você está?",
        )
        .choice("Um pouco melhor", TECNICA_5_SENTIDOS)
        .choice("Ainda estou muito ansioso(a)", CALMA),
        ConversationNode::new(CALMA, "Tudo bem, vamos com calma. Não há pressa.")
            .choice("Tentar respirar de novo", CRISE_RESPIRACAO)
            .choice("Quero ligar para o CVV", LIGAR_CVV),
        ConversationNode::new(
            TECNICA_5_SENTIDOS,
            "Agora olhe ao redor e nomeie 5 coisas que você vê, 4 que pode tocar, \
             3 que ouve, 2 que pode cheirar e 1 que pode saborear.",
        )
        .choice("Consegui", ENCERRAMENTO)
        .choice("Não consegui me concentrar", CALMA),
        ConversationNode::new(
            ENCERRAMENTO,
            "Você foi muito corajoso(a). Posso ajudar em mais alguma coisa?",
        )
        .choice("Não, obrigado(a)", FINALIZADO)
        .choice("Sim, quero recomeçar", home),
        ConversationNode::new(FINALIZADO, "Cuide-se! Estarei aqui sempre que precisar."),
        ConversationNode::new(
            LIGAR_CVV,
            "Estou abrindo a discagem para o CVV (188). Você não está sozinho(a).",
        )
        .choice("Voltar ao início", home)
        .with_side_effect(SideEffect::Dial),
    ]
}
