//! Tabla estática de respuestas enlatadas del responder offline.
//!
//! Solo lectura tras la carga. El orden de los pares (keyword, snippet) es
//! significativo: la búsqueda devuelve la primera coincidencia por subcadena.

pub(crate) const JAVASCRIPT_COMPLETIONS: &[(&str, &str)] = &[
    ("function sum", "function sum(a, b) {\n  return a + b;\n}"),
    (
        "const array",
        "const array = [1, 2, 3, 4, 5];\nconst sum = array.reduce((acc, curr) => acc + curr, 0);",
    ),
    (
        "class User",
        "class User {\n  constructor(name, email) {\n    this.name = name;\n    this.email = email;\n  }\n  \n  getInfo() {\n    return `${this.name} (${this.email})`;\n  }\n}",
    ),
    (
        "async function",
        "async function fetchData() {\n  try {\n    const response = await fetch('https://api.example.com/data');\n    const data = await response.json();\n    return data;\n  } catch (error) {\n    console.error('Error fetching data:', error);\n    return null;\n  }\n}",
    ),
];

pub(crate) const HTML_COMPLETIONS: &[(&str, &str)] = &[
    (
        "<div",
        "<div class=\"container\">\n  <h1>Hello World</h1>\n  <p>This is a paragraph.</p>\n</div>",
    ),
    (
        "<form",
        "<form action=\"/submit\" method=\"post\">\n  <label for=\"name\">Name:</label>\n  <input type=\"text\" id=\"name\" name=\"name\" required>\n  <button type=\"submit\">Submit</button>\n</form>",
    ),
];

pub(crate) const CSS_COMPLETIONS: &[(&str, &str)] = &[
    (
        ".container",
        ".container {\n  max-width: 1200px;\n  margin: 0 auto;\n  padding: 20px;\n  box-sizing: border-box;\n}",
    ),
    (
        "@media",
        "@media (max-width: 768px) {\n  .container {\n    padding: 10px;\n  }\n  \n  .column {\n    width: 100%;\n  }\n}",
    ),
];

pub(crate) const PYTHON_COMPLETIONS: &[(&str, &str)] = &[
    (
        "def calculate",
        "def calculate_average(numbers):\n    if not numbers:\n        return 0\n    return sum(numbers) / len(numbers)",
    ),
    (
        "class Person",
        "class Person:\n    def __init__(self, name, age):\n        self.name = name\n        self.age = age\n    \n    def greet(self):\n        return f\"Hello, my name is {self.name} and I am {self.age} years old.\"",
    ),
];

pub(crate) const CHAT_EXAMPLES: &[(&str, &str)] = &[
    (
        "How to optimize this code",
        "Here are some ways to optimize your code:\n\n1. Use appropriate data structures\n2. Minimize DOM manipulations\n3. Use efficient algorithms\n4. Implement caching where appropriate\n5. Reduce unnecessary calculations\n\nFor your specific code, I would recommend:\n- Replacing the nested loops with a more efficient algorithm\n- Caching repeated calculations\n- Using requestAnimationFrame for smoother animations",
    ),
    (
        "Explain this function",
        "This function implements a binary search algorithm. Binary search is an efficient way to find an element in a sorted array.\n\nThe function works by repeatedly dividing the search interval in half. If the value of the search key is less than the item in the middle of the interval, it narrows the interval to the lower half. Otherwise, it narrows it to the upper half.\n\nThe time complexity is O(log n), which is much better than linear search for large arrays.",
    ),
    (
        "How to fix this bug",
        "The bug in your code is caused by an off-by-one error in your loop condition. You're using `<=` when you should be using `<` (or vice versa).\n\nAlso, there's an issue with how you're handling the array index. Remember that array indices start at 0, not 1.\n\nHere's the corrected code:\n```javascript\nfor (let i = 0; i < array.length; i++) {\n  // Your code here\n}\n```",
    ),
];

pub(crate) const REFACTOR_EXAMPLES: &[(&str, &str)] = &[
    (
        "Refactor for readability",
        "Here's your code refactored for better readability:\n\n```javascript\nfunction processData(data) {\n  // Extract values\n  const { id, name, values } = data;\n  \n  // Calculate statistics\n  const sum = values.reduce((acc, val) => acc + val, 0);\n  const average = sum / values.length;\n  \n  // Format the result\n  return {\n    id,\n    name,\n    statistics: {\n      sum,\n      average,\n      count: values.length\n    }\n  };\n}\n```\n\nChanges made:\n1. Used destructuring for cleaner variable assignment\n2. Added comments to explain each section\n3. Organized the code into logical sections\n4. Used more descriptive variable names",
    ),
    (
        "Refactor using modern JS",
        "Here's your code refactored using modern JavaScript features:\n\n```javascript\n// Using arrow functions, template literals, and destructuring\nconst getFullName = ({ firstName, lastName }) => `${firstName} ${lastName}`;\n\n// Using the spread operator and array methods\nconst mergeArrays = (...arrays) => arrays.flat();\n\n// Using optional chaining and nullish coalescing\nconst getUserName = (user) => user?.profile?.username ?? \"Anonymous\";\n```\n\nThese modern features make your code more concise and expressive.",
    ),
];

pub(crate) const GENERAL_HELP: &[&str] = &[
    "I can help you with various coding tasks. Here are some things I can do:\n\n- Complete code based on your input\n- Explain code and concepts\n- Refactor code for better readability\n- Optimize code for better performance\n- Fix bugs in your code\n- Generate tests for your code\n- Document your code\n- Suggest design patterns\n\nJust let me know what you need!",
    "I'm here to assist with your coding tasks. Some ways I can help:\n\n- Code completion and suggestions\n- Code explanation and documentation\n- Refactoring and optimization\n- Bug fixing and debugging\n- Test generation\n- Design pattern suggestions\n\nWhat would you like help with today?",
];

pub(crate) const GENERAL_HELLO: &[&str] = &[
    "Hello! I'm your AI coding assistant. How can I help you with your code today?",
    "Hi there! I'm ready to help with your coding tasks. What are you working on?",
    "Greetings! I'm your AI pair programmer. What coding challenge can I help you with?",
];

pub(crate) const GENERAL_FEATURES: &[&str] = &[
    "I can help you with various coding tasks, including:\n\n- Code completion\n- Code explanation\n- Refactoring\n- Optimization\n- Bug fixing\n- Test generation\n- Documentation\n- Design pattern suggestions\n\nJust let me know what you need!",
    "My features include:\n\n- Intelligent code completion\n- Code analysis and explanation\n- Performance optimization suggestions\n- Refactoring recommendations\n- Bug detection and fixing\n- Test case generation\n- Documentation assistance\n- Design pattern recommendations\n\nHow can I assist you today?",
];

pub(crate) const GENERAL_CODE: &[&str] = &[
    "I can help you with your code in various ways. I can complete code snippets, explain how code works, suggest improvements, help fix bugs, and more. What specific help do you need with your code?",
    "I'm designed to assist with coding tasks. Whether you need help understanding code, writing new code, fixing bugs, or optimizing performance, I'm here to help. What are you working on?",
];

pub(crate) const GENERAL_DEFAULT: &[&str] = &[
    "I'm here to help with your coding tasks. Could you provide more details about what you're working on or what kind of assistance you need?",
    "I'd be happy to assist you. To provide the most relevant help, could you share more about your current project or the specific coding challenge you're facing?",
    "I'm your AI coding assistant. To better help you, could you tell me more about what you're trying to accomplish or what problem you're trying to solve?",
];

/// Búsqueda por clave exacta en una tabla de pares.
pub(crate) fn lookup<'a>(table: &'a [(&str, &str)], key: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(entry_key, _)| *entry_key == key)
        .map(|(_, value)| *value)
}
