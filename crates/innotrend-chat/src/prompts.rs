//! Prompt templates for the labeler and the narrator.

/// Lead-in every monthly summary must start with.
pub fn month_lead_in(year_month: &str) -> String {
    format!("Summary of innovations for year-month {} are:", year_month)
}

/// Ask for the technology terms among a comma-joined bigram list.
pub fn technology_terms(list_of_terms: &str) -> String {
    format!(
        "In the following list of terms find and return any words/terms that refer\n\
         to a particular technology or innovation.\n\
         Please return output words/terms in a list format in Python.\n\
         Do not put anything else in the list. Only technology and innovation related terms.\n\
         List of Terms: {}\n",
        list_of_terms
    )
}

pub const MONTHLY_REQUEST: &str = "Based on the patents in the context provided, describe the general areas of innovation/technology and their application in the real world.";

/// Monthly RAG prompt over `count` abstracts joined by `|`.
pub fn monthly_summary(year_month: &str, count: usize, context: &str) -> String {
    format!(
        "Use the following context to respond to the request at the end.\n\
         The context is a list of patent abstracts separated by '|'.\n\
         There are {count} patent abstracts in the list.\n\
         Read the information in the context and use your general knowledge related to\n\
         that information to produce a concise and less technical answer to the question.\n\
         Do not give information not mentioned in the context.\n\
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
         Your answer should include \"{lead_in}\" in the beginning of your response.\n\
         {context}\n\
         Request: {request}\n",
        count = count,
        lead_in = month_lead_in(year_month),
        context = context,
        request = MONTHLY_REQUEST,
    )
}

pub const AGGREGATE_REQUEST: &str = "Based on the information in the context provided, describe whether there are innovation themes that are persistent over the period.\n\
What do you predict the trajectory of innovations be in the future based on the chronological order of information provided in the context?";

/// Second-pass prompt over the monthly summaries.
pub fn aggregate_trends(context: &str) -> String {
    format!(
        "Use the following context to respond to the request at the end.\n\
         The context is a list of summaries of innovations for each of multiple months.\n\
         In your answer pay attention to the dates provided in the context.\n\
         Read the information in the context and use your general knowledge related to\n\
         that information to produce a concise and less technical answer to the question.\n\
         Do not give information not mentioned in the context.\n\
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
         {}\n\
         Request: {}\n",
        context, AGGREGATE_REQUEST
    )
}
