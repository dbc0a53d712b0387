//! Analysis Prompt
//!
//! The single consolidated query sent to the multi-agent service. The
//! requested output format mirrors what the interpreter looks for.

use crate::analysis::Dimension;
use crate::intake::AnalysisRequest;

fn dimension_brief(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Market => "market size, demand and growth in the target GCC countries",
        Dimension::Financial => "unit economics, funding needs and path to profitability",
        Dimension::Technical => "feasibility of building and operating the product",
        Dimension::Legal => "licensing, data protection and sector regulation",
        Dimension::Cultural => "fit with local business culture, language and customer habits",
        Dimension::Competitive => "incumbents, substitutes and defensibility",
    }
}

/// Heading the prompt asks the model to use for each score line
pub fn score_heading(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Market => "Market Score",
        Dimension::Financial => "Financial Score",
        Dimension::Technical => "Technical Score",
        Dimension::Legal => "Legal Score",
        Dimension::Cultural => "Cultural Score",
        Dimension::Competitive => "Competitive Score",
    }
}

pub fn build_analysis_prompt(request: &AnalysisRequest) -> String {
    let mut prompt = String::new();
    prompt.push_str("Please analyze this startup for the GCC market.\n\n");
    prompt.push_str(&format!("Business: {}\n", request.business_description().trim()));
    prompt.push_str(&format!("Target Markets: {}\n", request.target_markets().label()));
    prompt.push_str(&format!("Stage: {}\n", request.business_stage().label()));
    prompt.push_str(&format!("Model: {}\n", request.business_model().label()));
    if let Some(doc) = request.document() {
        prompt.push_str(&format!("Supporting document: {}\n", doc.file_name()));
    }

    prompt.push_str("\nEvaluate these six dimensions:\n");
    for (i, dimension) in Dimension::ALL.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. {} ({})\n",
            i + 1,
            dimension.label(),
            dimension_brief(*dimension)
        ));
    }

    prompt.push_str("\nRespond in exactly this format:\n");
    for dimension in Dimension::ALL {
        prompt.push_str(&format!("{}: <0-100>/100\n", score_heading(dimension)));
    }
    prompt.push_str(
        "\nStrengths:\n- <top strength>\n\
         \nConcerns:\n- <top concern>\n\
         \nRecommendations:\n- <top recommendation>\n\
         \nList three to five items per section. Keep the response concise but comprehensive.\n",
    );
    prompt
}
